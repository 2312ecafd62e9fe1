use eightbit_core::memory::MemoryMap;
use eightbit_harness::digest::memory_digest;
use eightbit_harness::registry;
use eightbit_harness::{RunConfig, record, replay};

/// ```text
/// 1000  LDX  #$2000
/// 1003  LDY  #$3000
/// 1007  LDU  #$4000
/// 100A  PSHS A,B
/// 100C  STA  ,X+
/// 100E  STB  1,Y
/// 1010  LEAY 2,Y
/// 1012  PULS A,B
/// 1014  INCA
/// 1015  DECB
/// 1016  BVS  $101E     never taken
/// 1018  CMPA #$08
/// 101A  BNE  $100A
/// 101C  STD  ,U
/// 101E  BRA  $101E
/// ```
#[rustfmt::skip]
const PROGRAM: [u8; 32] = [
    0x8E, 0x20, 0x00,
    0x10, 0x8E, 0x30, 0x00,
    0xCE, 0x40, 0x00,
    0x34, 0x06,
    0xA7, 0x80,
    0xE7, 0x21,
    0x31, 0x22,
    0x35, 0x06,
    0x4C,
    0x5A,
    0x29, 0x06,
    0x81, 0x08,
    0x26, 0xEE,
    0xED, 0xC4,
    0x20, 0xFE,
];

/// SHA-1 of memory after the 100-instruction reference run.
const FINAL_DIGEST: &str = "9135b789db2cd404629516c0366557f1df21c5a7";

/// Cycles for the 100 instructions: three loads, eight passes of the loop,
/// STD, then 24 turns of the closing BRA.
const FINAL_CYCLES: u64 = (3 + 4 + 3) + 8 * (7 + 6 + 5 + 5 + 7 + 2 + 2 + 3 + 2 + 3) + 5 + 24 * 3;

#[test]
fn test_reference_run_final_state() {
    let mut target = (registry::find("6809").unwrap().create)();
    let log = record(target.as_mut(), &RunConfig::default(), &PROGRAM, "fixture.raw", false).unwrap();

    assert_eq!(log.states.len(), 101);
    assert_eq!(log.load_addr, 0x1000);

    let first = &log.states[0].regs;
    assert_eq!(first["b"], 0x44);
    assert_eq!(first["x"], 0xABAB);
    assert_eq!(first["y"], 0x02E0);
    assert_eq!(first["u"], 0x02E0);
    assert_eq!(first["s"], 0x7F34);
    assert_eq!(first["flags"]["bits"], 0x84);
    assert_eq!(log.states[0].mem, [0x8E, 0x20, 0x00, 0x10, 0x8E]);

    let last = log.states.last().unwrap();
    assert_eq!(last.regs["a"], 0x08);
    assert_eq!(last.regs["b"], 0x3C);
    assert_eq!(last.regs["x"], 0x2008);
    assert_eq!(last.regs["y"], 0x3010);
    assert_eq!(last.regs["u"], 0x4000);
    assert_eq!(last.regs["s"], 0x7F34);
    assert_eq!(last.regs["pc"], 0x101E);
    assert_eq!(last.regs["flags"]["bits"], 0x80);
    assert_eq!(last.cycles, FINAL_CYCLES);
    assert_eq!(last.digest.as_deref(), Some(FINAL_DIGEST));
}

#[test]
fn test_reference_run_loop_pass() {
    let mut target = (registry::find("6809").unwrap().create)();
    let log = record(target.as_mut(), &RunConfig::default(), &PROGRAM, "fixture.raw", false).unwrap();

    // After PSHS A,B in the first pass
    assert_eq!(log.states[4].regs["s"], 0x7F32);
    assert_eq!(log.states[4].cycles, 10 + 7);
    // STA ,X+ post-increments
    assert_eq!(log.states[5].regs["x"], 0x2001);
    assert_eq!(log.states[5].cycles, 10 + 7 + 6);
    // STB 1,Y leaves Y alone; LEAY 2,Y moves it
    assert_eq!(log.states[6].regs["y"], 0x3000);
    assert_eq!(log.states[7].regs["y"], 0x3002);
    // PULS A,B restores S
    assert_eq!(log.states[8].regs["s"], 0x7F34);
    // BVS falls through
    assert_eq!(log.states[11].regs["pc"], 0x1018);
    // BNE goes back round
    assert_eq!(log.states[13].regs["pc"], 0x100A);
    // Last pass: BNE falls through to STD
    assert_eq!(log.states[75].regs["pc"], 0x101C);
    assert_eq!(log.states[76].regs["pc"], 0x101E);
}

#[test]
fn test_reference_run_digests_dirty_states() {
    let mut target = (registry::find("6809").unwrap().create)();
    let log = record(target.as_mut(), &RunConfig::default(), &PROGRAM, "fixture.raw", false).unwrap();

    // PSHS, STA and STB write memory; the loads, LEAY, PULS and branches do not
    let hashed: Vec<_> = log
        .states
        .iter()
        .enumerate()
        .filter(|(_, s)| s.digest.is_some())
        .map(|(i, _)| i)
        .collect();
    let mut expected = vec![0];
    for pass in 0..8 {
        let start = 4 + pass * 9;
        expected.extend([start, start + 1, start + 2]);
    }
    expected.extend([76, 100]);
    assert_eq!(hashed, expected);
}

#[test]
fn test_reference_run_without_digests() {
    let config = RunConfig {
        digest: false,
        ..RunConfig::default()
    };
    let mut target = (registry::find("6809").unwrap().create)();
    let log = record(target.as_mut(), &config, &PROGRAM, "fixture.raw", false).unwrap();

    let hashed: Vec<_> = log
        .states
        .iter()
        .enumerate()
        .filter(|(_, s)| s.digest.is_some())
        .map(|(i, _)| i)
        .collect();
    assert_eq!(hashed, vec![0, 100]);
    assert_eq!(log.states[100].digest.as_deref(), Some(FINAL_DIGEST));
}

#[test]
fn test_reference_run_is_deterministic() {
    let run = || {
        let mut target = (registry::find("6809").unwrap().create)();
        record(target.as_mut(), &RunConfig::default(), &PROGRAM, "fixture.raw", false).unwrap()
    };
    assert_eq!(run(), run());
}

#[test]
fn test_reference_run_replays() {
    let mut target = (registry::find("6809").unwrap().create)();
    let log = record(target.as_mut(), &RunConfig::default(), &PROGRAM, "fixture.raw", true).unwrap();

    let mut fresh = (registry::find("6809").unwrap().create)();
    let result = replay(fresh.as_mut(), &log, &PROGRAM, true, false).unwrap();
    assert_eq!(result.instructions, 100);
    assert_eq!(result.cycles, FINAL_CYCLES);
}

#[test]
fn test_memory_digest_of_final_image() {
    // The bytes the reference run leaves behind, written without a CPU
    let mut map = MemoryMap::flat_ram();
    map.load(0x1000, &PROGRAM);
    for i in 0..8u16 {
        map.write_byte(0x2000 + i, i as u8);
        map.write_byte(0x3001 + 2 * i, 0x44 - i as u8);
    }
    map.load(0x4000, &[0x08, 0x3C]);
    map.load(0x7F32, &[0x07, 0x3D]);
    assert_eq!(memory_digest(&map), FINAL_DIGEST);
}
