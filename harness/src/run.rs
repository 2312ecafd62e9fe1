//! Recording a run into a [`RunLog`] and replaying one against a CPU.

use eightbit_core::cpu::{Exit, StepResult};
use eightbit_core::memory::MemoryMap;
use tracing::{info, warn};

use crate::config::RunConfig;
use crate::digest::memory_digest;
use crate::error::HarnessError;
use crate::runlog::{RunLog, State, build_memory};
use crate::target::Target;

/// Totals from a successful replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Replay {
    pub instructions: usize,
    pub cycles: u64,
}

fn bytes_at(mem: &MemoryMap, pc: u16) -> [u8; 5] {
    std::array::from_fn(|i| mem.peek(pc.wrapping_add(i as u16)))
}

fn capture(
    target: &dyn Target,
    mem: &MemoryMap,
    cycles: u64,
    hash: bool,
) -> Result<State, HarnessError> {
    Ok(State {
        regs: target.registers()?,
        digest: hash.then(|| memory_digest(mem)),
        cycles,
        mem: bytes_at(mem, target.pc()),
    })
}

fn trace_step(pc: u16, code: &[u8; 5], result: &StepResult, regs: &serde_json::Value) {
    info!(
        "{pc:04X}  {:02X} {:02X} {:02X} {:02X} {:02X}  ({:2})  {regs}",
        code[0], code[1], code[2], code[3], code[4], result.cycles
    );
}

/// Run `config.instructions` instructions of `image` and log the state
/// before the first and after each one.
///
/// Memory is digested at the first and last state, and after any
/// instruction that wrote RAM when `config.digest` is set. An illegal
/// opcode or a wait ends the run early.
pub fn record(
    target: &mut dyn Target,
    config: &RunConfig,
    image: &[u8],
    file_name: &str,
    verbose: bool,
) -> Result<RunLog, HarnessError> {
    let mut mem = build_memory(&config.memory)?;
    mem.load(config.load_addr, image);
    info!("{file_name} loaded to {:04X}", config.load_addr);

    match config.registers_json()? {
        Some(regs) => target.set_registers(&regs)?,
        None => target.power_on(&mut mem),
    }
    info!("initial state set, PC = {:04X}", target.pc());

    let mut states = Vec::with_capacity(config.instructions + 1);
    let mut cycles = 0u64;
    states.push(capture(target, &mem, cycles, true)?);
    mem.clear_dirty();

    for i in 1..=config.instructions {
        let pc = target.pc();
        let code = bytes_at(&mem, pc);
        let result = target.step_instruction(&mut mem);
        cycles += result.cycles.max(0) as u64;

        let stopped = result.exit != Exit::BudgetSpent;
        let last = i == config.instructions || stopped;
        let hash = last || (config.digest && mem.is_dirty());
        if hash {
            mem.clear_dirty();
        }

        let state = capture(target, &mem, cycles, hash)?;
        if verbose {
            trace_step(pc, &code, &result, &state.regs);
        }
        states.push(state);

        match result.exit {
            Exit::Illegal { pc, opcode } => {
                warn!("run stopped after {i} instructions: illegal opcode {opcode:#04X} at {pc:#06X}");
                break;
            }
            Exit::Waiting => {
                warn!("run stopped after {i} instructions: CPU is waiting for an interrupt");
                break;
            }
            Exit::BudgetSpent => {}
        }
    }

    info!("run complete: {} instructions, {cycles} cycles", states.len() - 1);

    Ok(RunLog {
        file_name: file_name.to_string(),
        load_addr: config.load_addr,
        memory: config.memory.clone(),
        states,
    })
}

/// Re-execute a log and stop at the first state that disagrees.
pub fn replay(
    target: &mut dyn Target,
    log: &RunLog,
    image: &[u8],
    check_digest: bool,
    verbose: bool,
) -> Result<Replay, HarnessError> {
    let first = log.states.first().ok_or(HarnessError::EmptyLog)?;

    let mut mem = log.memory_map()?;
    mem.load(log.load_addr, image);
    target.set_registers(&first.regs)?;

    if check_digest {
        check_digest_at(0, first, &mem)?;
    }

    let mut cycles = 0u64;
    for (i, pair) in log.states.windows(2).enumerate() {
        let (before, after) = (&pair[0], &pair[1]);
        let step = i + 1;

        let pc = target.pc();
        let code = bytes_at(&mem, pc);
        let result = target.step_instruction(&mut mem);
        let spent = result.cycles.max(0) as u64;
        cycles += spent;

        if verbose {
            trace_step(pc, &code, &result, &target.registers()?);
        }

        if !target.registers_match(&after.regs)? {
            return Err(HarnessError::Mismatch {
                step,
                field: "registers",
                expected: after.regs.to_string(),
                actual: target.registers()?.to_string(),
            });
        }

        let logged = after.cycles.saturating_sub(before.cycles);
        if spent != logged {
            return Err(HarnessError::Mismatch {
                step,
                field: "cycles",
                expected: logged.to_string(),
                actual: spent.to_string(),
            });
        }

        let actual = bytes_at(&mem, target.pc());
        if actual != after.mem {
            return Err(HarnessError::Mismatch {
                step,
                field: "memory at PC",
                expected: format!("{:02X?}", after.mem),
                actual: format!("{actual:02X?}"),
            });
        }

        if check_digest {
            check_digest_at(step, after, &mem)?;
        }
    }

    let instructions = log.states.len() - 1;
    info!("replayed {instructions} instructions, {cycles} cycles");
    Ok(Replay {
        instructions,
        cycles,
    })
}

fn check_digest_at(step: usize, state: &State, mem: &MemoryMap) -> Result<(), HarnessError> {
    let Some(expected) = &state.digest else {
        return Ok(());
    };
    let actual = memory_digest(mem);
    if actual != *expected {
        return Err(HarnessError::Mismatch {
            step,
            field: "memory digest",
            expected: expected.clone(),
            actual,
        });
    }
    Ok(())
}
