//! Line draw.
//!
//! The host precomputes the Bresenham terms. Each point sets one
//! destination pixel, then the pen takes a major step, and a minor step too
//! when the error term was not negative. Y steps move by the destination
//! stride.

use crate::cache::Caches;
use crate::copy::{bit, word_address};
use crate::memory::BbaMemory;
use crate::scratchpad::{
    DST_ADDRESS, DST_STRIDE, DST_X, LINE_COUNT, LINE_DECREMENT, LINE_ERROR, LINE_INCREMENT,
    LINE_MAJOR, LINE_X_STEP, LINE_Y_STEP, Scratchpad,
};

pub(crate) fn draw<M: BbaMemory + ?Sized>(pad: &Scratchpad, caches: &mut Caches, mem: &mut M) {
    let x_step = i16::from(pad.word(LINE_X_STEP) as i8) as u16;
    let y_step = i32::from(pad.word(LINE_Y_STEP) as i8) * i32::from(pad.signed(DST_STRIDE));
    let increment = pad.signed(LINE_INCREMENT);
    let decrement = pad.signed(LINE_DECREMENT);
    let x_major = pad.word(LINE_MAJOR) == 0;

    let mut error = pad.signed(LINE_ERROR);
    let mut row = pad.address(DST_ADDRESS);
    let mut x = pad.word(DST_X);

    for _ in 0..pad.word(LINE_COUNT) {
        let address = word_address(row, x);
        let word = caches.read_destination(mem, address);
        caches.write_destination(mem, address, word | bit(x));

        let minor = error >= 0;
        error = if minor {
            error.wrapping_sub(decrement)
        } else {
            error.wrapping_add(increment)
        };
        if x_major || minor {
            x = x.wrapping_add(x_step);
        }
        if !x_major || minor {
            row = row.wrapping_add(y_step as u32);
        }
    }
}
