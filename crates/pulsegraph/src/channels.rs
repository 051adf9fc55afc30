//! Mapping mixed frames to physical channel names.
//!
//! A downstream consumer of the flattened/scheduled program: given the mixed
//! frames a program references and a backend channel table, produce the
//! physical channel name each mixed frame is realized on. Drive and
//! measurement channels follow the `d{index}` / `m{index}` naming
//! convention; cross-qubit drive pairs are looked up in the backend's
//! control channel table.
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::graph::ProgramGraph;
use crate::model::{Frame, LogicalElement, MixedFrame};

/// The physical channel layout of a backend: the control channels available
/// for cross-qubit drive, keyed by `(driven qubit, frame qubit)`.
#[derive(Clone, Debug, Default)]
pub struct ChannelTable {
    control: HashMap<(u32, u32), String>,
}

impl ChannelTable {
    /// Create an empty channel table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the control channel driving `qubit` in the frame of
    /// `frame_qubit`.
    pub fn add_control_channel(
        &mut self,
        qubit: u32,
        frame_qubit: u32,
        name: impl Into<String>,
    ) -> &mut Self {
        self.control.insert((qubit, frame_qubit), name.into());
        self
    }

    /// Look up the control channel for a `(driven qubit, frame qubit)` pair.
    pub fn control_channel(&self, qubit: u32, frame_qubit: u32) -> Option<&str> {
        self.control.get(&(qubit, frame_qubit)).map(String::as_str)
    }
}

/// Map every mixed frame referenced by `program` to a physical channel name.
///
/// Native rules: a qubit paired with its own drive frame maps to
/// `d{index}`, with its own measurement frame to `m{index}`, and with
/// another qubit's drive frame to the backend's control channel for the
/// pair. Any mixed frame left unmapped fails with
/// [`Error::UnmappedChannel`].
pub fn map_mixed_frames(
    program: &ProgramGraph,
    channels: &ChannelTable,
) -> Result<HashMap<MixedFrame, String>> {
    let mut mapping = HashMap::new();
    for mixed_frame in program.mixed_frames()? {
        match native_channel(&mixed_frame, channels) {
            Some(name) => {
                mapping.insert(mixed_frame, name);
            }
            None => {
                // Falling back to otherwise unused channels is a known
                // possibility here, but deliberately not implemented.
                return Err(Error::UnmappedChannel(mixed_frame.name()));
            }
        }
    }
    Ok(mapping)
}

fn native_channel(mixed_frame: &MixedFrame, channels: &ChannelTable) -> Option<String> {
    let LogicalElement::Qubit { index } = *mixed_frame.logical_element() else {
        return None;
    };
    match *mixed_frame.frame() {
        Frame::Qubit { index: frame_index } => {
            if index == frame_index {
                Some(format!("d{index}"))
            } else {
                channels
                    .control_channel(index, frame_index)
                    .map(str::to_string)
            }
        }
        Frame::Measurement { index: frame_index } if index == frame_index => {
            Some(format!("m{index}"))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Alignment;
    use crate::instruction::{GenericInstruction, InstructionKind, Operand, Waveform};

    fn play(qubit: i64, frame: Frame) -> GenericInstruction {
        GenericInstruction::new(
            InstructionKind::Play,
            Operand::Waveform(Waveform::new("drag", 256)),
            Some(LogicalElement::qubit(qubit).unwrap()),
            Some(frame),
        )
        .unwrap()
    }

    fn mixed(qubit: i64, frame: Frame) -> MixedFrame {
        MixedFrame::new(LogicalElement::qubit(qubit).unwrap(), frame)
    }

    #[test]
    fn own_drive_frame_maps_to_drive_channel() {
        let mut program = ProgramGraph::new(Alignment::Left);
        program.append(play(1, Frame::qubit(1).unwrap()));

        let mapping = map_mixed_frames(&program, &ChannelTable::new()).unwrap();
        assert_eq!(
            mapping[&mixed(1, Frame::qubit(1).unwrap())],
            "d1".to_string()
        );
    }

    #[test]
    fn own_measurement_frame_maps_to_measure_channel() {
        let mut program = ProgramGraph::new(Alignment::Left);
        program.append(play(1, Frame::measurement(1).unwrap()));

        let mapping = map_mixed_frames(&program, &ChannelTable::new()).unwrap();
        assert_eq!(
            mapping[&mixed(1, Frame::measurement(1).unwrap())],
            "m1".to_string()
        );
    }

    #[test]
    fn cross_drive_frame_uses_the_control_table() {
        let mut program = ProgramGraph::new(Alignment::Left);
        program.append(play(3, Frame::qubit(4).unwrap()));

        let mut channels = ChannelTable::new();
        channels.add_control_channel(3, 4, "u5");

        let mapping = map_mixed_frames(&program, &channels).unwrap();
        assert_eq!(
            mapping[&mixed(3, Frame::qubit(4).unwrap())],
            "u5".to_string()
        );
    }

    #[test]
    fn missing_control_table_entry_is_a_hard_failure() {
        let mut program = ProgramGraph::new(Alignment::Left);
        program.append(play(3, Frame::qubit(4).unwrap()));

        let err = map_mixed_frames(&program, &ChannelTable::new()).unwrap_err();
        assert!(matches!(err, Error::UnmappedChannel(_)));
    }

    #[test]
    fn cross_measurement_frame_is_unmapped() {
        let mut program = ProgramGraph::new(Alignment::Left);
        program.append(play(0, Frame::measurement(2).unwrap()));

        assert!(matches!(
            map_mixed_frames(&program, &ChannelTable::new()),
            Err(Error::UnmappedChannel(_))
        ));
    }

    #[test]
    fn generic_frames_are_unmapped() {
        let mut program = ProgramGraph::new(Alignment::Left);
        program.append(play(2, Frame::generic("1-2 transition", 100.2)));

        assert!(matches!(
            map_mixed_frames(&program, &ChannelTable::new()),
            Err(Error::UnmappedChannel(_))
        ));
    }
}
