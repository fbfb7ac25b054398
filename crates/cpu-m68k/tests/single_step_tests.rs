//! Single-instruction tests in the `ProcessorTests` 68000 JSON format.
//!
//! Each case gives the full register file, the two prefetched words and the
//! RAM bytes touched, before and after one instruction. The `pc` field is
//! the address of the opcode; internally PC runs four bytes ahead of it.
//!
//! A handful of cases are embedded below. The full suite is read from
//! `test-data/680x0/68000/v1/*.json` when that directory exists.

use cpu_m68k::Cpu68000;
use emu_core::SimpleBus;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct TestCase {
    name: String,
    initial: CpuState,
    #[serde(rename = "final")]
    final_state: CpuState,
}

#[derive(Debug, Deserialize)]
struct CpuState {
    d0: u32,
    d1: u32,
    d2: u32,
    d3: u32,
    d4: u32,
    d5: u32,
    d6: u32,
    d7: u32,
    a0: u32,
    a1: u32,
    a2: u32,
    a3: u32,
    a4: u32,
    a5: u32,
    a6: u32,
    usp: u32,
    ssp: u32,
    sr: u16,
    pc: u32,
    prefetch: [u32; 2],
    ram: Vec<(u32, u8)>,
}

impl CpuState {
    fn d(&self) -> [u32; 8] {
        [
            self.d0, self.d1, self.d2, self.d3, self.d4, self.d5, self.d6, self.d7,
        ]
    }

    fn a(&self) -> [u32; 7] {
        [self.a0, self.a1, self.a2, self.a3, self.a4, self.a5, self.a6]
    }
}

fn setup(cpu: &mut Cpu68000, bus: &mut SimpleBus, state: &CpuState) {
    for &(address, value) in &state.ram {
        bus.load(address, &[value]);
    }
    cpu.regs.d = state.d();
    cpu.regs.a = state.a();
    cpu.regs.usp = state.usp;
    cpu.regs.ssp = state.ssp;
    cpu.regs.sr = state.sr;
    cpu.regs.pc = state.pc.wrapping_add(4);
    cpu.setup_prefetch(state.prefetch[0] as u16, state.prefetch[1] as u16);
}

fn compare(cpu: &Cpu68000, bus: &SimpleBus, expected: &CpuState) -> Vec<String> {
    let mut errors = Vec::new();

    for (i, (&got, want)) in cpu.regs.d.iter().zip(expected.d()).enumerate() {
        if got != want {
            errors.push(format!("D{i} mismatch: got 0x{got:08X}, expected 0x{want:08X}"));
        }
    }
    for (i, (&got, want)) in cpu.regs.a.iter().zip(expected.a()).enumerate() {
        if got != want {
            errors.push(format!("A{i} mismatch: got 0x{got:08X}, expected 0x{want:08X}"));
        }
    }
    if cpu.regs.usp != expected.usp {
        errors.push(format!(
            "USP mismatch: got 0x{:08X}, expected 0x{:08X}",
            cpu.regs.usp, expected.usp
        ));
    }
    if cpu.regs.ssp != expected.ssp {
        errors.push(format!(
            "SSP mismatch: got 0x{:08X}, expected 0x{:08X}",
            cpu.regs.ssp, expected.ssp
        ));
    }
    errors.extend(sr_differences(cpu.regs.sr, expected.sr));
    let pc = cpu.regs.pc.wrapping_sub(4);
    if pc != expected.pc {
        errors.push(format!(
            "PC mismatch: got 0x{pc:08X}, expected 0x{:08X}",
            expected.pc
        ));
    }
    for &(address, want) in &expected.ram {
        let got = bus.peek(address);
        if got != want {
            errors.push(format!(
                "RAM[0x{address:06X}] mismatch: got 0x{got:02X}, expected 0x{want:02X}"
            ));
        }
    }
    errors
}

/// SR fields compared one by one, so a report names the flag that differs.
const SR_FIELDS: [(&str, u16); 8] = [
    ("T", 0x8000),
    ("S", 0x2000),
    ("mask", 0x0700),
    ("X", 0x0010),
    ("N", 0x0008),
    ("Z", 0x0004),
    ("V", 0x0002),
    ("C", 0x0001),
];

fn sr_differences(got: u16, want: u16) -> Vec<String> {
    SR_FIELDS
        .iter()
        .filter(|&&(_, bits)| got & bits != want & bits)
        .map(|&(name, bits)| {
            let shift = bits.trailing_zeros();
            format!(
                "SR {name} mismatch: got {}, expected {} (SR 0x{got:04X} vs 0x{want:04X})",
                (got & bits) >> shift,
                (want & bits) >> shift
            )
        })
        .collect()
}

fn run_case(test: &TestCase) -> Result<(), Vec<String>> {
    let mut cpu = Cpu68000::new();
    let mut bus = SimpleBus::new();
    setup(&mut cpu, &mut bus, &test.initial);

    if let Err(error) = cpu.execute(&mut bus) {
        return Err(vec![format!("{}: {error}", test.name)]);
    }

    let errors = compare(&cpu, &bus, &test.final_state);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors
            .into_iter()
            .map(|e| format!("{}: {e}", test.name))
            .collect())
    }
}

/// Returns (passed, failed, first few errors).
fn run_cases(tests: &[TestCase]) -> (usize, usize, Vec<String>) {
    let mut passed = 0;
    let mut failed = 0;
    let mut first_errors = Vec::new();
    for test in tests {
        match run_case(test) {
            Ok(()) => passed += 1,
            Err(errors) => {
                failed += 1;
                if first_errors.len() < 20 {
                    first_errors.extend(errors.into_iter().take(3));
                }
            }
        }
    }
    (passed, failed, first_errors)
}

fn suite_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("parent of crate dir")
        .parent()
        .expect("workspace root")
        .join("test-data/680x0/68000/v1")
}

const EMBEDDED: &str = r#"[
  {
    "name": "7005 [MOVEQ #5, D0]",
    "initial": {
      "d0": 4294967295, "d1": 0, "d2": 0, "d3": 0, "d4": 0, "d5": 0, "d6": 0, "d7": 0,
      "a0": 0, "a1": 0, "a2": 0, "a3": 0, "a4": 0, "a5": 0, "a6": 0,
      "usp": 0, "ssp": 8192, "sr": 9999, "pc": 4096,
      "prefetch": [28677, 20081],
      "ram": [[4096, 112], [4097, 5], [4098, 78], [4099, 113], [4100, 78], [4101, 113]]
    },
    "final": {
      "d0": 5, "d1": 0, "d2": 0, "d3": 0, "d4": 0, "d5": 0, "d6": 0, "d7": 0,
      "a0": 0, "a1": 0, "a2": 0, "a3": 0, "a4": 0, "a5": 0, "a6": 0,
      "usp": 0, "ssp": 8192, "sr": 10000, "pc": 4098,
      "prefetch": [20081, 20081],
      "ram": []
    }
  },
  {
    "name": "d041 [ADD.W D1, D0]",
    "initial": {
      "d0": 65535, "d1": 1, "d2": 0, "d3": 0, "d4": 0, "d5": 0, "d6": 0, "d7": 0,
      "a0": 0, "a1": 0, "a2": 0, "a3": 0, "a4": 0, "a5": 0, "a6": 0,
      "usp": 0, "ssp": 8192, "sr": 9984, "pc": 4096,
      "prefetch": [53313, 20081],
      "ram": [[4096, 208], [4097, 65], [4098, 78], [4099, 113]]
    },
    "final": {
      "d0": 0, "d1": 1, "d2": 0, "d3": 0, "d4": 0, "d5": 0, "d6": 0, "d7": 0,
      "a0": 0, "a1": 0, "a2": 0, "a3": 0, "a4": 0, "a5": 0, "a6": 0,
      "usp": 0, "ssp": 8192, "sr": 10005, "pc": 4098,
      "prefetch": [20081, 0],
      "ram": []
    }
  },
  {
    "name": "2f00 [MOVE.L D0, -(A7)]",
    "initial": {
      "d0": 305419896, "d1": 0, "d2": 0, "d3": 0, "d4": 0, "d5": 0, "d6": 0, "d7": 0,
      "a0": 0, "a1": 0, "a2": 0, "a3": 0, "a4": 0, "a5": 0, "a6": 0,
      "usp": 0, "ssp": 8192, "sr": 9988, "pc": 4096,
      "prefetch": [12032, 20081],
      "ram": [[4096, 47], [4097, 0], [4098, 78], [4099, 113]]
    },
    "final": {
      "d0": 305419896, "d1": 0, "d2": 0, "d3": 0, "d4": 0, "d5": 0, "d6": 0, "d7": 0,
      "a0": 0, "a1": 0, "a2": 0, "a3": 0, "a4": 0, "a5": 0, "a6": 0,
      "usp": 0, "ssp": 8188, "sr": 9984, "pc": 4098,
      "prefetch": [20081, 0],
      "ram": [[8188, 18], [8189, 52], [8190, 86], [8191, 120]]
    }
  },
  {
    "name": "80c1 [DIVU.W D1, D0]",
    "initial": {
      "d0": 100, "d1": 7, "d2": 0, "d3": 0, "d4": 0, "d5": 0, "d6": 0, "d7": 0,
      "a0": 0, "a1": 0, "a2": 0, "a3": 0, "a4": 0, "a5": 0, "a6": 0,
      "usp": 0, "ssp": 8192, "sr": 9999, "pc": 4096,
      "prefetch": [32961, 20081],
      "ram": [[4096, 128], [4097, 193], [4098, 78], [4099, 113]]
    },
    "final": {
      "d0": 131086, "d1": 7, "d2": 0, "d3": 0, "d4": 0, "d5": 0, "d6": 0, "d7": 0,
      "a0": 0, "a1": 0, "a2": 0, "a3": 0, "a4": 0, "a5": 0, "a6": 0,
      "usp": 0, "ssp": 8192, "sr": 10000, "pc": 4098,
      "prefetch": [20081, 0],
      "ram": []
    }
  },
  {
    "name": "6004 [BRA.S *+6]",
    "initial": {
      "d0": 0, "d1": 0, "d2": 0, "d3": 0, "d4": 0, "d5": 0, "d6": 0, "d7": 0,
      "a0": 0, "a1": 0, "a2": 0, "a3": 0, "a4": 0, "a5": 0, "a6": 0,
      "usp": 0, "ssp": 8192, "sr": 9984, "pc": 4096,
      "prefetch": [24580, 0],
      "ram": [[4096, 96], [4097, 4], [4102, 78], [4103, 113]]
    },
    "final": {
      "d0": 0, "d1": 0, "d2": 0, "d3": 0, "d4": 0, "d5": 0, "d6": 0, "d7": 0,
      "a0": 0, "a1": 0, "a2": 0, "a3": 0, "a4": 0, "a5": 0, "a6": 0,
      "usp": 0, "ssp": 8192, "sr": 9984, "pc": 4102,
      "prefetch": [20081, 0],
      "ram": []
    }
  }
]"#;

#[test]
fn sr_report_names_each_differing_field() {
    assert!(sr_differences(0x2704, 0x2704).is_empty());

    // mask, X and C differ; S and Z agree
    let report = sr_differences(0x2015, 0x2704);
    assert_eq!(report.len(), 3, "{report:#?}");
    assert!(report[0].starts_with("SR mask mismatch: got 0, expected 7"));
    assert!(report[1].starts_with("SR X mismatch: got 1, expected 0"));
    assert!(report[2].starts_with("SR C mismatch: got 1, expected 0"));
}

#[test]
fn embedded_cases() {
    let tests: Vec<TestCase> = serde_json::from_str(EMBEDDED).expect("embedded fixtures parse");
    let (passed, failed, errors) = run_cases(&tests);
    assert_eq!(failed, 0, "{passed} passed, errors: {errors:#?}");
}

#[test]
fn suite_moveq() {
    let path = suite_dir().join("MOVE.q.json");
    if !path.exists() {
        eprintln!("Test file not found: {}", path.display());
        return;
    }
    let data = fs::read_to_string(&path).expect("read fixture");
    let tests: Vec<TestCase> = serde_json::from_str(&data).expect("parse fixture");
    let (passed, failed, errors) = run_cases(&tests);
    println!("MOVE.q: {passed} passed, {failed} failed");
    for err in errors.iter().take(10) {
        println!("  {err}");
    }
}

/// Run every file in the suite (called manually, not in CI).
#[test]
#[ignore]
fn run_all_single_step_tests() {
    let pattern = suite_dir().join("*.json");
    let mut paths: Vec<PathBuf> = glob::glob(&pattern.to_string_lossy())
        .expect("valid glob pattern")
        .filter_map(Result::ok)
        .collect();
    if paths.is_empty() {
        eprintln!("No test files under {}", suite_dir().display());
        return;
    }
    paths.sort();

    let mut total_passed = 0;
    let mut total_failed = 0;
    for path in &paths {
        let data = fs::read_to_string(path).expect("read fixture");
        let tests: Vec<TestCase> = match serde_json::from_str(&data) {
            Ok(tests) => tests,
            Err(e) => {
                println!("{}: parse error {e}", path.display());
                continue;
            }
        };
        let (passed, failed, errors) = run_cases(&tests);
        let stem = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
        if failed > 0 {
            println!("{stem}: {passed} passed, {failed} failed");
            for err in errors.iter().take(3) {
                println!("  {err}");
            }
        } else {
            println!("{stem}: {passed} passed");
        }
        total_passed += passed;
        total_failed += failed;
    }
    println!("\n=== Total: {total_passed} passed, {total_failed} failed ===");
}
