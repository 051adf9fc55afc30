//! Instruction model: typed leaf operations of a program.
//!
//! This module defines the leaf payloads of a program graph: the
//! [`GenericInstruction`] kinds (play, delay, set/shift frequency and phase)
//! and the [`AcquireInstruction`]. Every instruction carries a fixed,
//! non-negative duration and an optional absolute start time `t0` that stays
//! unset until an external scheduling pass fills it in.
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::{Error, Result};
use crate::model::{Frame, LogicalElement};

/// A waveform envelope referenced by a play instruction.
///
/// Only the duration participates in IR semantics; numerical synthesis of
/// samples is outside this crate.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Waveform {
    name: String,
    duration: u64,
}

impl Waveform {
    /// Create a waveform descriptor with the given name and duration.
    pub fn new(name: impl Into<String>, duration: u64) -> Self {
        Self {
            name: name.into(),
            duration,
        }
    }

    /// The name of the waveform.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The duration of the waveform, in system time units.
    pub fn duration(&self) -> u64 {
        self.duration
    }
}

/// A classical memory slot an acquisition result is written to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MemorySlot(pub u32);

impl fmt::Display for MemorySlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MemorySlot{}", self.0)
    }
}

/// The kind of a [`GenericInstruction`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InstructionKind {
    Play,
    Delay,
    SetFrequency,
    ShiftFrequency,
    SetPhase,
    ShiftPhase,
}

impl fmt::Display for InstructionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InstructionKind::Play => "Play",
            InstructionKind::Delay => "Delay",
            InstructionKind::SetFrequency => "SetFrequency",
            InstructionKind::ShiftFrequency => "ShiftFrequency",
            InstructionKind::SetPhase => "SetPhase",
            InstructionKind::ShiftPhase => "ShiftPhase",
        };
        f.write_str(name)
    }
}

/// The operand of a [`GenericInstruction`]; which variant is accepted
/// depends on the instruction kind.
#[derive(Clone, Debug)]
pub enum Operand {
    /// The envelope played by a play instruction.
    Waveform(Waveform),
    /// The length of a delay instruction, validated to be non-negative.
    Delay(i64),
    /// The frequency or phase value of a set/shift instruction.
    Value(f64),
}

impl PartialEq for Operand {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Operand::Waveform(a), Operand::Waveform(b)) => a == b,
            (Operand::Delay(a), Operand::Delay(b)) => a == b,
            (Operand::Value(a), Operand::Value(b)) => a.to_bits() == b.to_bits(),
            _ => false,
        }
    }
}

impl Eq for Operand {}

impl Hash for Operand {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Operand::Waveform(w) => w.hash(state),
            Operand::Delay(v) => v.hash(state),
            Operand::Value(v) => v.to_bits().hash(state),
        }
    }
}

/// A generic leaf instruction: play, delay, or a frequency/phase update.
///
/// Construction cross-checks the operand and the required target fields for
/// the kind and derives the duration; both are immutable afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GenericInstruction {
    kind: InstructionKind,
    operand: Operand,
    logical_element: Option<LogicalElement>,
    frame: Option<Frame>,
    duration: u64,
    t0: Option<u64>,
}

impl GenericInstruction {
    /// Create a new instruction with `t0` unset.
    ///
    /// Validation rules per kind:
    /// - `Delay`: non-negative [`Operand::Delay`]; logical element required;
    ///   duration is the operand value.
    /// - `Play`: [`Operand::Waveform`]; logical element and frame required;
    ///   duration is the waveform duration.
    /// - set/shift frequency/phase: [`Operand::Value`]; frame required;
    ///   duration is zero.
    pub fn new(
        kind: InstructionKind,
        operand: Operand,
        logical_element: Option<LogicalElement>,
        frame: Option<Frame>,
    ) -> Result<Self> {
        let duration = match kind {
            InstructionKind::Delay => {
                let Operand::Delay(value) = operand else {
                    return Err(Error::InvalidInstruction(
                        "the operand of a Delay instruction must be an integer".into(),
                    ));
                };
                if value < 0 {
                    return Err(Error::InvalidInstruction(
                        "the operand of a Delay instruction must be a non-negative integer".into(),
                    ));
                }
                if logical_element.is_none() {
                    return Err(Error::InvalidInstruction(
                        "a Delay instruction must have an associated logical element".into(),
                    ));
                }
                value as u64
            }
            InstructionKind::Play => {
                let Operand::Waveform(ref waveform) = operand else {
                    return Err(Error::InvalidInstruction(
                        "the operand of a Play instruction must be a waveform".into(),
                    ));
                };
                if logical_element.is_none() || frame.is_none() {
                    return Err(Error::InvalidInstruction(
                        "a Play instruction must have an associated logical element and frame"
                            .into(),
                    ));
                }
                waveform.duration()
            }
            InstructionKind::SetFrequency
            | InstructionKind::ShiftFrequency
            | InstructionKind::SetPhase
            | InstructionKind::ShiftPhase => {
                if !matches!(operand, Operand::Value(_)) {
                    return Err(Error::InvalidInstruction(format!(
                        "the operand of a {kind} instruction must be a numeric value"
                    )));
                }
                if frame.is_none() {
                    return Err(Error::InvalidInstruction(format!(
                        "a {kind} instruction must have an associated frame"
                    )));
                }
                0
            }
        };

        Ok(Self {
            kind,
            operand,
            logical_element,
            frame,
            duration,
            t0: None,
        })
    }

    /// Set the start time at construction.
    pub fn with_t0(mut self, t0: u64) -> Self {
        self.t0 = Some(t0);
        self
    }

    /// The kind of this instruction.
    pub fn kind(&self) -> InstructionKind {
        self.kind
    }

    /// The operand of this instruction.
    pub fn operand(&self) -> &Operand {
        &self.operand
    }

    /// The logical element this instruction acts on, if bound.
    pub fn logical_element(&self) -> Option<&LogicalElement> {
        self.logical_element.as_ref()
    }

    /// The frame this instruction refers to, if bound.
    pub fn frame(&self) -> Option<&Frame> {
        self.frame.as_ref()
    }

    /// The duration, in system time units.
    pub fn duration(&self) -> u64 {
        self.duration
    }

    /// The absolute start time, unset until scheduled.
    pub fn t0(&self) -> Option<u64> {
        self.t0
    }

    /// Assign the absolute start time.
    pub fn set_t0(&mut self, t0: u64) {
        self.t0 = Some(t0);
    }

    /// Shift the start time by a relative amount.
    pub fn shift_t0(&mut self, delta: i64) -> Result<()> {
        self.t0 = Some(shifted_t0(self.t0, delta)?);
        Ok(())
    }

    /// `t0 + duration`, defined only once `t0` is set.
    pub fn final_time(&self) -> Option<u64> {
        self.t0.map(|t0| t0 + self.duration)
    }
}

impl fmt::Display for GenericInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(duration={}, t0={:?})", self.kind, self.duration, self.t0)
    }
}

/// An acquisition instruction binding a qubit to a memory slot.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AcquireInstruction {
    qubit: LogicalElement,
    memory_slot: MemorySlot,
    duration: u64,
    t0: Option<u64>,
}

impl AcquireInstruction {
    /// Create a new acquisition with `t0` unset. The logical element must be
    /// a qubit.
    pub fn new(qubit: LogicalElement, memory_slot: MemorySlot, duration: u64) -> Result<Self> {
        if !qubit.is_qubit() {
            return Err(Error::InvalidInstruction(format!(
                "an Acquire instruction must target a qubit, got {qubit}"
            )));
        }
        Ok(Self {
            qubit,
            memory_slot,
            duration,
            t0: None,
        })
    }

    /// Set the start time at construction.
    pub fn with_t0(mut self, t0: u64) -> Self {
        self.t0 = Some(t0);
        self
    }

    /// The acquired qubit.
    pub fn qubit(&self) -> &LogicalElement {
        &self.qubit
    }

    /// The memory slot the result is written to.
    pub fn memory_slot(&self) -> MemorySlot {
        self.memory_slot
    }

    /// The duration, in system time units.
    pub fn duration(&self) -> u64 {
        self.duration
    }

    /// The absolute start time, unset until scheduled.
    pub fn t0(&self) -> Option<u64> {
        self.t0
    }

    /// Assign the absolute start time.
    pub fn set_t0(&mut self, t0: u64) {
        self.t0 = Some(t0);
    }

    /// Shift the start time by a relative amount.
    pub fn shift_t0(&mut self, delta: i64) -> Result<()> {
        self.t0 = Some(shifted_t0(self.t0, delta)?);
        Ok(())
    }

    /// `t0 + duration`, defined only once `t0` is set.
    pub fn final_time(&self) -> Option<u64> {
        self.t0.map(|t0| t0 + self.duration)
    }
}

impl fmt::Display for AcquireInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Acquire(qubit={}, memory_slot={}, duration={}, t0={:?})",
            self.qubit, self.memory_slot, self.duration, self.t0
        )
    }
}

/// Any leaf instruction a program node can hold.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Instruction {
    Generic(GenericInstruction),
    Acquire(AcquireInstruction),
}

impl Instruction {
    /// The duration, in system time units.
    pub fn duration(&self) -> u64 {
        match self {
            Instruction::Generic(inst) => inst.duration(),
            Instruction::Acquire(inst) => inst.duration(),
        }
    }

    /// The absolute start time, unset until scheduled.
    pub fn t0(&self) -> Option<u64> {
        match self {
            Instruction::Generic(inst) => inst.t0(),
            Instruction::Acquire(inst) => inst.t0(),
        }
    }

    /// Assign the absolute start time.
    pub fn set_t0(&mut self, t0: u64) {
        match self {
            Instruction::Generic(inst) => inst.set_t0(t0),
            Instruction::Acquire(inst) => inst.set_t0(t0),
        }
    }

    /// Shift the start time by a relative amount.
    pub fn shift_t0(&mut self, delta: i64) -> Result<()> {
        match self {
            Instruction::Generic(inst) => inst.shift_t0(delta),
            Instruction::Acquire(inst) => inst.shift_t0(delta),
        }
    }

    /// `t0 + duration`, defined only once `t0` is set.
    pub fn final_time(&self) -> Option<u64> {
        match self {
            Instruction::Generic(inst) => inst.final_time(),
            Instruction::Acquire(inst) => inst.final_time(),
        }
    }

    /// The generic instruction, if this is one.
    pub fn as_generic(&self) -> Option<&GenericInstruction> {
        match self {
            Instruction::Generic(inst) => Some(inst),
            Instruction::Acquire(_) => None,
        }
    }

    /// The acquisition instruction, if this is one.
    pub fn as_acquire(&self) -> Option<&AcquireInstruction> {
        match self {
            Instruction::Acquire(inst) => Some(inst),
            Instruction::Generic(_) => None,
        }
    }
}

impl From<GenericInstruction> for Instruction {
    fn from(inst: GenericInstruction) -> Self {
        Instruction::Generic(inst)
    }
}

impl From<AcquireInstruction> for Instruction {
    fn from(inst: AcquireInstruction) -> Self {
        Instruction::Acquire(inst)
    }
}

fn shifted_t0(t0: Option<u64>, delta: i64) -> Result<u64> {
    let Some(t0) = t0 else {
        return Err(Error::Unscheduled(
            "can not shift the start time of an untimed instruction".into(),
        ));
    };
    let shifted = t0 as i64 + delta;
    if shifted < 0 {
        return Err(Error::InvalidInstruction(
            "t0 must be a non-negative integer".into(),
        ));
    }
    Ok(shifted as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qubit(index: i64) -> LogicalElement {
        LogicalElement::qubit(index).unwrap()
    }

    fn drive_frame(index: i64) -> Frame {
        Frame::qubit(index).unwrap()
    }

    #[test]
    fn play_derives_duration_from_waveform() {
        let inst = GenericInstruction::new(
            InstructionKind::Play,
            Operand::Waveform(Waveform::new("drag", 256)),
            Some(qubit(1)),
            Some(drive_frame(1)),
        )
        .unwrap();
        assert_eq!(inst.duration(), 256);
        assert_eq!(inst.t0(), None);
    }

    #[test]
    fn play_requires_a_frame() {
        let err = GenericInstruction::new(
            InstructionKind::Play,
            Operand::Waveform(Waveform::new("drag", 256)),
            Some(qubit(1)),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidInstruction(_)));
    }

    #[test]
    fn play_rejects_non_waveform_operand() {
        let err = GenericInstruction::new(
            InstructionKind::Play,
            Operand::Value(1.5),
            Some(qubit(1)),
            Some(drive_frame(1)),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidInstruction(_)));
    }

    #[test]
    fn delay_duration_is_the_operand() {
        let inst = GenericInstruction::new(
            InstructionKind::Delay,
            Operand::Delay(176),
            Some(qubit(1)),
            None,
        )
        .unwrap();
        assert_eq!(inst.duration(), 176);
    }

    #[test]
    fn delay_rejects_negative_operand() {
        let err = GenericInstruction::new(
            InstructionKind::Delay,
            Operand::Delay(-5),
            Some(qubit(1)),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidInstruction(_)));
    }

    #[test]
    fn delay_requires_a_logical_element() {
        let err =
            GenericInstruction::new(InstructionKind::Delay, Operand::Delay(16), None, None)
                .unwrap_err();
        assert!(matches!(err, Error::InvalidInstruction(_)));
    }

    #[test]
    fn frequency_and_phase_updates_have_zero_duration() {
        for kind in [
            InstructionKind::SetFrequency,
            InstructionKind::ShiftFrequency,
            InstructionKind::SetPhase,
            InstructionKind::ShiftPhase,
        ] {
            let inst =
                GenericInstruction::new(kind, Operand::Value(0.5), None, Some(drive_frame(0)))
                    .unwrap();
            assert_eq!(inst.duration(), 0);
        }
    }

    #[test]
    fn frequency_update_requires_a_frame() {
        let err = GenericInstruction::new(
            InstructionKind::SetFrequency,
            Operand::Value(1e9),
            Some(qubit(1)),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidInstruction(_)));
    }

    #[test]
    fn shift_of_untimed_instruction_fails() {
        let mut inst = GenericInstruction::new(
            InstructionKind::Delay,
            Operand::Delay(16),
            Some(qubit(0)),
            None,
        )
        .unwrap();
        assert!(matches!(inst.shift_t0(10), Err(Error::Unscheduled(_))));
    }

    #[test]
    fn shift_below_zero_fails() {
        let mut inst = GenericInstruction::new(
            InstructionKind::Delay,
            Operand::Delay(16),
            Some(qubit(0)),
            None,
        )
        .unwrap()
        .with_t0(5);
        assert!(matches!(
            inst.shift_t0(-6),
            Err(Error::InvalidInstruction(_))
        ));
    }

    #[test]
    fn shift_moves_the_start_time() {
        let mut inst = GenericInstruction::new(
            InstructionKind::Play,
            Operand::Waveform(Waveform::new("gaussian_square", 3520)),
            Some(qubit(1)),
            Some(Frame::measurement(1).unwrap()),
        )
        .unwrap()
        .with_t0(0);
        inst.shift_t0(256).unwrap();
        assert_eq!(inst.t0(), Some(256));
        assert_eq!(inst.final_time(), Some(3776));
    }

    #[test]
    fn acquire_requires_a_qubit() {
        let err = AcquireInstruction::new(
            LogicalElement::coupler(0, 1).unwrap(),
            MemorySlot(0),
            3520,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidInstruction(_)));
    }

    #[test]
    fn acquire_final_time_tracks_t0() {
        let mut inst = AcquireInstruction::new(qubit(1), MemorySlot(3), 3520).unwrap();
        assert_eq!(inst.final_time(), None);
        inst.set_t0(256);
        assert_eq!(inst.final_time(), Some(3776));
    }

    #[test]
    fn independently_built_instructions_compare_equal() {
        let build = || {
            GenericInstruction::new(
                InstructionKind::Play,
                Operand::Waveform(Waveform::new("drag", 256)),
                Some(qubit(1)),
                Some(drive_frame(1)),
            )
            .unwrap()
        };
        assert_eq!(build(), build());
    }
}
