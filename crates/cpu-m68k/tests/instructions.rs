//! Short programs run through reset and `Cpu::step`.

use cpu_m68k::{C, Cpu68000, CpuError, X, Z};
use emu_core::{Cpu, Observable, SimpleBus, Value};

const SSP: u32 = 0x8000;
const ORIGIN: u32 = 0x400;

/// Vector table with SSP and PC, the program at `ORIGIN`, then reset.
fn boot(program: &[u16]) -> (Cpu68000, SimpleBus) {
    let mut bus = SimpleBus::new();
    bus.load(0, &SSP.to_be_bytes());
    bus.load(4, &ORIGIN.to_be_bytes());
    load_words(&mut bus, ORIGIN, program);
    let mut cpu = Cpu68000::new();
    cpu.reset(&mut bus).expect("reset");
    (cpu, bus)
}

fn load_words(bus: &mut SimpleBus, address: u32, words: &[u16]) {
    let bytes: Vec<u8> = words.iter().flat_map(|w| w.to_be_bytes()).collect();
    bus.load(address, &bytes);
}

fn set_vector(bus: &mut SimpleBus, vector: u32, handler: u32) {
    bus.load(vector * 4, &handler.to_be_bytes());
}

fn peek_word(bus: &SimpleBus, address: u32) -> u16 {
    u16::from_be_bytes([bus.peek(address), bus.peek(address + 1)])
}

fn peek_long(bus: &SimpleBus, address: u32) -> u32 {
    (u32::from(peek_word(bus, address)) << 16) | u32::from(peek_word(bus, address + 2))
}

fn run(cpu: &mut Cpu68000, bus: &mut SimpleBus, steps: usize) {
    for _ in 0..steps {
        cpu.step(bus).expect("step");
    }
}

#[test]
fn reset_loads_stack_and_entry_point() {
    let (cpu, _) = boot(&[0x4E71]);
    assert_eq!(cpu.regs.ssp, SSP);
    assert_eq!(cpu.pc(), ORIGIN);
    assert_eq!(cpu.regs.sr, 0x2700);
    assert_eq!(cpu.prefetch().0, 0x4E71);
}

#[test]
fn dbf_loop_runs_count_plus_one_times() {
    let (mut cpu, mut bus) = boot(&[
        0x7203, // MOVEQ #3,D1
        0x5280, // loop: ADDQ.L #1,D0
        0x51C9, 0xFFFC, // DBF D1,loop
        0x4E71, // NOP
    ]);
    run(&mut cpu, &mut bus, 9);
    assert_eq!(cpu.regs.d[0], 4);
    assert_eq!(cpu.regs.d[1] & 0xFFFF, 0xFFFF);
    assert_eq!(cpu.pc(), 0x408);
}

#[test]
fn bsr_and_rts_use_the_supervisor_stack() {
    let (mut cpu, mut bus) = boot(&[
        0x6104, // BSR.S sub
        0x7401, // MOVEQ #1,D2
        0x4E71, // NOP
        0x7007, // sub: MOVEQ #7,D0
        0x4E75, // RTS
    ]);
    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.pc(), 0x406);
    assert_eq!(cpu.regs.ssp, SSP - 4);
    assert_eq!(peek_long(&bus, SSP - 4), 0x402);

    run(&mut cpu, &mut bus, 3);
    assert_eq!(cpu.regs.d[0], 7);
    assert_eq!(cpu.regs.d[2], 1);
    assert_eq!(cpu.regs.ssp, SSP);
    assert_eq!(cpu.pc(), 0x404);
}

#[test]
fn trap_and_rte_round_trip() {
    let (mut cpu, mut bus) = boot(&[0x4E40, 0x4E71]); // TRAP #0
    set_vector(&mut bus, 32, 0x500);
    load_words(&mut bus, 0x500, &[0x4E73]); // RTE

    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.pc(), 0x500);
    assert_eq!(cpu.regs.ssp, SSP - 6);
    assert_eq!(peek_word(&bus, SSP - 6), 0x2700);
    assert_eq!(peek_long(&bus, SSP - 4), 0x402);

    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.pc(), 0x402);
    assert_eq!(cpu.regs.ssp, SSP);
}

#[test]
fn divide_by_zero_traps_with_carry_clear() {
    let (mut cpu, mut bus) = boot(&[0x80C1, 0x4E71]); // DIVU D1,D0
    set_vector(&mut bus, 5, 0x600);
    cpu.regs.d[0] = 100;
    cpu.regs.sr |= C;

    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.pc(), 0x600);
    assert_eq!(cpu.regs.d[0], 100);
    assert_eq!(cpu.regs.sr & C, 0);
    assert_eq!(peek_long(&bus, SSP - 4), 0x402);
}

#[test]
fn divu_overflow_leaves_destination() {
    let (mut cpu, mut bus) = boot(&[0x80C1]); // DIVU D1,D0
    cpu.regs.d[0] = 0x0010_0000;
    cpu.regs.d[1] = 1;
    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.regs.d[0], 0x0010_0000);
    assert_eq!(cpu.query("flags.v"), Some(Value::Bool(true)));
}

#[test]
fn divs_keeps_remainder_sign() {
    let (mut cpu, mut bus) = boot(&[0x81C1]); // DIVS D1,D0
    cpu.regs.d[0] = (-7i32) as u32;
    cpu.regs.d[1] = 2;
    run(&mut cpu, &mut bus, 1);
    // quotient -3, remainder -1
    assert_eq!(cpu.regs.d[0], 0xFFFF_FFFD);
    assert_eq!(cpu.query("flags.n"), Some(Value::Bool(true)));
}

#[test]
fn muls_sign_extends_both_operands() {
    let (mut cpu, mut bus) = boot(&[0xC1C1]); // MULS D1,D0
    cpu.regs.d[0] = 0xAAAA_FFFE; // -2
    cpu.regs.d[1] = 0x0000_0003;
    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.regs.d[0], (-6i32) as u32);
}

#[test]
fn privileged_instruction_in_user_mode_traps() {
    let (mut cpu, mut bus) = boot(&[
        0x46FC, 0x0000, // MOVE #$0000,SR
        0x46FC, 0x2700, // MOVE #$2700,SR
    ]);
    set_vector(&mut bus, 8, 0x700);
    cpu.regs.usp = 0x4000;

    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.regs.sr, 0x0000);
    assert_eq!(cpu.regs.a(7), 0x4000);

    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.pc(), 0x700);
    assert!(cpu.regs.is_supervisor());
    assert_eq!(peek_word(&bus, SSP - 6), 0x0000);
    assert_eq!(peek_long(&bus, SSP - 4), 0x404);
    assert_eq!(cpu.regs.usp, 0x4000);
}

#[test]
fn odd_word_write_builds_address_error_frame() {
    let (mut cpu, mut bus) = boot(&[0x3080]); // MOVE.W D0,(A0)
    set_vector(&mut bus, 3, 0x800);
    cpu.regs.a[0] = 0x1001;

    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.pc(), 0x800);
    assert_eq!(cpu.regs.ssp, SSP - 14);
    // write, not instruction fetch, supervisor data
    assert_eq!(peek_word(&bus, SSP - 14), 0x3085);
    assert_eq!(peek_long(&bus, SSP - 12), 0x1001);
    assert_eq!(peek_word(&bus, SSP - 8), 0x3080);
    assert_eq!(peek_word(&bus, SSP - 6), 0x2700);
    assert_eq!(peek_long(&bus, SSP - 4), 0x402);
}

#[test]
fn interrupt_is_taken_once_mask_allows_it() {
    let (mut cpu, mut bus) = boot(&[
        0x4E71, // NOP
        0x46FC, 0x2000, // MOVE #$2000,SR
        0x4E71,
    ]);
    set_vector(&mut bus, 27, 0x900);
    cpu.set_ipl(3);

    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.pc(), 0x402);

    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.pc(), 0x900);
    assert_eq!(cpu.regs.interrupt_mask(), 3);
    assert_eq!(peek_word(&bus, SSP - 6), 0x2000);
    assert_eq!(peek_long(&bus, SSP - 4), 0x406);
}

#[test]
fn level_seven_reenters_while_held() {
    let (mut cpu, mut bus) = boot(&[0x4E71, 0x4E71]);
    set_vector(&mut bus, 31, 0xA00);
    load_words(&mut bus, 0xA00, &[0x4E71, 0x4E71, 0x4E71]);
    cpu.set_ipl(7);

    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.pc(), 0xA00);
    assert_eq!(cpu.regs.ssp, SSP - 6);

    // mask is already 7, level 7 is taken again
    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.pc(), 0xA00);
    assert_eq!(cpu.regs.ssp, SSP - 12);
    assert_eq!(peek_word(&bus, SSP - 12), 0x2700);
    assert_eq!(peek_long(&bus, SSP - 10), 0xA02);

    cpu.set_ipl(0);
    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.pc(), 0xA02);
    assert_eq!(cpu.regs.ssp, SSP - 12);
}

#[test]
fn unimplemented_opcode_stops_execution() {
    let (mut cpu, mut bus) = boot(&[0xA000]);
    assert_eq!(
        cpu.step(&mut bus),
        Err(CpuError::Unimplemented {
            mnemonic: "LINE-A",
            opcode: 0xA000,
            pc: ORIGIN,
        })
    );
}

#[test]
fn illegal_opcode_is_fatal() {
    let (mut cpu, mut bus) = boot(&[0x4AFC]);
    assert!(matches!(
        cpu.step(&mut bus),
        Err(CpuError::Illegal { opcode: 0x4AFC, .. })
    ));
}

#[test]
fn movem_saves_and_restores_registers() {
    let (mut cpu, mut bus) = boot(&[
        0x48E7, 0xC080, // MOVEM.L D0-D1/A0,-(A7)
        0x7000, // MOVEQ #0,D0
        0x7200, // MOVEQ #0,D1
        0x91C8, // SUBA.L A0,A0
        0x4CDF, 0x0103, // MOVEM.L (A7)+,D0-D1/A0
    ]);
    cpu.regs.d[0] = 0x1111_1111;
    cpu.regs.d[1] = 0x2222_2222;
    cpu.regs.a[0] = 0x3333_3333;

    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.regs.ssp, SSP - 12);
    assert_eq!(peek_long(&bus, SSP - 12), 0x1111_1111);
    assert_eq!(peek_long(&bus, SSP - 8), 0x2222_2222);
    assert_eq!(peek_long(&bus, SSP - 4), 0x3333_3333);

    run(&mut cpu, &mut bus, 3);
    assert_eq!(cpu.regs.a[0], 0);

    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.regs.d[0], 0x1111_1111);
    assert_eq!(cpu.regs.d[1], 0x2222_2222);
    assert_eq!(cpu.regs.a[0], 0x3333_3333);
    assert_eq!(cpu.regs.ssp, SSP);
}

#[test]
fn lea_and_pc_relative_addressing() {
    let (mut cpu, mut bus) = boot(&[
        0x41FA, 0x0010, // LEA (16,PC),A0
        0x303A, 0x000C, // MOVE.W (12,PC),D0
    ]);
    load_words(&mut bus, 0x412, &[0xBEEF]);
    run(&mut cpu, &mut bus, 2);
    assert_eq!(cpu.regs.a[0], 0x412);
    assert_eq!(cpu.regs.d[0] & 0xFFFF, 0xBEEF);
}

#[test]
fn logical_shift_sets_extend_from_last_bit_out() {
    let (mut cpu, mut bus) = boot(&[
        0xE948, // LSL.W #4,D0
        0xE248, // LSR.W #1,D0
    ]);
    cpu.regs.d[0] = 0x1234_8001;
    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.regs.d[0], 0x1234_0010);
    assert_eq!(cpu.regs.sr & (X | C), 0);

    cpu.regs.d[0] = 0x0000_0001;
    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.regs.d[0], 0);
    assert_eq!(cpu.regs.sr & (X | Z | C), X | Z | C);
}

#[test]
fn compare_and_branch() {
    let (mut cpu, mut bus) = boot(&[
        0xB041, // CMP.W D1,D0
        0x6702, // BEQ.S +2
        0x7001, // MOVEQ #1,D0
        0x7402, // MOVEQ #2,D2
    ]);
    cpu.regs.d[0] = 5;
    cpu.regs.d[1] = 5;
    run(&mut cpu, &mut bus, 3);
    assert_eq!(cpu.regs.d[0], 5);
    assert_eq!(cpu.regs.d[2], 2);
}

#[test]
fn cycles_advance_with_each_step() {
    let (mut cpu, mut bus) = boot(&[0x4E71, 0x4E71]);
    let before = cpu.total_cycles();
    let ticks = cpu.step(&mut bus).expect("step");
    assert_eq!(ticks.get(), 4);
    assert_eq!(cpu.total_cycles().get() - before.get(), 4);
    assert_eq!(cpu.query("d0"), Some(Value::U32(0)));
}
