//! Bitmap, tile and cursor copies.
//!
//! All three share [`copy_row`]. Pixels are addressed by a base address and
//! a 16-bit X: the word lives at `base + ((x / 8) & !1)` and the pixel is
//! bit `x % 16` of it, least significant bit leftmost. Stepping left past
//! X 0 wraps to 0xFFFF, nearly 8 KiB past the base.

use crate::cache::{Caches, Role};
use crate::function;
use crate::memory::BbaMemory;
use crate::scratchpad::{
    DST_ADDRESS, DST_STRIDE, DST_X, FUNCTION, HEIGHT, MASK_ADDRESS, MASK_STRIDE, MASK_X,
    SRC_ADDRESS, SRC_STRIDE, SRC_X, Scratchpad, TILE_ADDRESS, WIDTH, command,
};

/// Tile and cursor images are 16 rows of one word.
const PATTERN_BYTES: u32 = 32;

pub(crate) fn word_address(base: u32, x: u16) -> u32 {
    base.wrapping_add(u32::from((x / 8) & !1))
}

pub(crate) fn bit(x: u16) -> u16 {
    1 << (x % 16)
}

/// Where one destination row takes its inputs from.
#[derive(Debug, Clone, Copy)]
struct Row {
    source: Option<u32>,
    mask: Option<u32>,
    destination: u32,
    /// Source X stays within one word.
    wrap_source: bool,
    /// Mask X stays within one word.
    wrap_mask: bool,
}

/// Step one pixel. A wrapped X is reduced after the step, so a first X of
/// 16 or more still reads outside the pattern word.
fn advance(x: u16, left: bool, wrap: bool) -> u16 {
    let next = if left { x.wrapping_sub(1) } else { x.wrapping_add(1) };
    if wrap { next % 16 } else { next }
}

fn copy_row<M: BbaMemory + ?Sized>(pad: &Scratchpad, caches: &mut Caches, mem: &mut M, row: Row) {
    let left = pad.has(command::LEFT);
    let code = pad.word(FUNCTION);
    let mut src_x = pad.word(SRC_X);
    let mut mask_x = pad.word(MASK_X);
    let mut dst_x = pad.word(DST_X);

    for _ in 0..pad.word(WIDTH) {
        let src = match row.source {
            Some(base) => caches.read(mem, Role::Source, word_address(base, src_x)) & bit(src_x) != 0,
            None => false,
        };
        let selected = match row.mask {
            Some(base) => caches.read(mem, Role::Mask, word_address(base, mask_x)) & bit(mask_x) != 0,
            None => true,
        };

        let address = word_address(row.destination, dst_x);
        let word = caches.read_destination(mem, address);
        if selected {
            let pixel = bit(dst_x);
            let out = if function::apply(code, src, word & pixel != 0) {
                word | pixel
            } else {
                word & !pixel
            };
            caches.write_destination(mem, address, out);
        }

        src_x = advance(src_x, left, row.wrap_source);
        mask_x = advance(mask_x, left, row.wrap_mask);
        dst_x = advance(dst_x, left, false);
    }
}

fn vertical_sign(pad: &Scratchpad) -> i32 {
    if pad.has(command::UP) { -1 } else { 1 }
}

fn stride(pad: &Scratchpad, offset: u16) -> i32 {
    i32::from(pad.signed(offset))
}

/// Copy `height` rows, updating the destination and mask addresses and the
/// height in the scratchpad as it goes.
fn rows<M, F>(pad: &mut Scratchpad, caches: &mut Caches, mem: &mut M, dst_stride: i32, mut row_for: F)
where
    M: BbaMemory + ?Sized,
    F: FnMut(&Scratchpad, u32) -> Row,
{
    let mask_stride = if pad.has(command::MASK) {
        vertical_sign(pad) * stride(pad, MASK_STRIDE)
    } else {
        0
    };
    let mut index = 0;
    while pad.word(HEIGHT) != 0 {
        let row = row_for(pad, index);
        copy_row(pad, caches, mem, row);
        index += 1;
        pad.advance(DST_ADDRESS, dst_stride);
        pad.advance(MASK_ADDRESS, mask_stride);
        pad.set_word(HEIGHT, pad.word(HEIGHT) - 1);
    }
}

fn pattern_row(base: u32, index: u32) -> u32 {
    base.wrapping_add((index * 2) % PATTERN_BYTES)
}

/// Plain bitmap copy. Without the source bit every source pixel reads 0.
pub(crate) fn bitmap<M: BbaMemory + ?Sized>(pad: &mut Scratchpad, caches: &mut Caches, mem: &mut M) {
    let sign = vertical_sign(pad);
    let src_stride = sign * stride(pad, SRC_STRIDE);
    let source = pad.has(command::SOURCE).then(|| pad.address(SRC_ADDRESS));
    let masked = pad.has(command::MASK);
    rows(pad, caches, mem, sign * stride(pad, DST_STRIDE), |pad, index| Row {
        source: source.map(|base| base.wrapping_add(src_stride.wrapping_mul(index as i32) as u32)),
        mask: masked.then(|| pad.address(MASK_ADDRESS)),
        destination: pad.address(DST_ADDRESS),
        wrap_source: false,
        wrap_mask: false,
    });
}

/// Fill from the 16x16 tile, cycling its rows. The destination stride is
/// applied as programmed, whatever the direction flag says.
pub(crate) fn tile<M: BbaMemory + ?Sized>(pad: &mut Scratchpad, caches: &mut Caches, mem: &mut M) {
    let base = pad.address(TILE_ADDRESS);
    let masked = pad.has(command::MASK);
    rows(pad, caches, mem, stride(pad, DST_STRIDE), |pad, index| Row {
        source: Some(pattern_row(base, index)),
        mask: masked.then(|| pad.address(MASK_ADDRESS)),
        destination: pad.address(DST_ADDRESS),
        wrap_source: true,
        wrap_mask: false,
    });
}

/// Draw the 16x16 cursor image through its 16x16 mask.
pub(crate) fn cursor<M: BbaMemory + ?Sized>(pad: &mut Scratchpad, caches: &mut Caches, mem: &mut M) {
    let image = pad.address(SRC_ADDRESS);
    let mask = pad.address(MASK_ADDRESS);
    let dst_stride = vertical_sign(pad) * stride(pad, DST_STRIDE);
    let mut index = 0;
    while pad.word(HEIGHT) != 0 {
        let row = Row {
            source: Some(pattern_row(image, index)),
            mask: Some(pattern_row(mask, index)),
            destination: pad.address(DST_ADDRESS),
            wrap_source: true,
            wrap_mask: true,
        };
        copy_row(pad, caches, mem, row);
        index += 1;
        pad.advance(DST_ADDRESS, dst_stride);
        pad.set_word(HEIGHT, pad.word(HEIGHT) - 1);
    }
}
