//! Motion instruction types and text rendering
//!
//! Instructions render to one line of G-code each. Coordinates always carry
//! three decimals and feeds/accelerations are whole numbers, so identical
//! programs produce byte-identical text.

use std::fmt;

/// Comment text marking the start of a replenishment cycle
pub const REPLENISHMENT_MARKER: &str = "--- replenishment cycle ---";

/// Rule drawn above and below each layer heading
pub const LAYER_RULE: &str = "===================================";

/// Axis targets and feed for a G0/G1 move; unset words are omitted
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Move {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
    pub feed: Option<f64>,
}

impl Move {
    pub fn xy(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    pub fn z(z: f64) -> Self {
        Self {
            z: Some(z),
            ..Self::default()
        }
    }

    pub fn feed(feed: f64) -> Self {
        Self {
            feed: Some(feed),
            ..Self::default()
        }
    }

    pub fn with_z(mut self, z: f64) -> Self {
        self.z = Some(z);
        self
    }

    pub fn with_feed(mut self, feed: f64) -> Self {
        self.feed = Some(feed);
        self
    }

    /// Whether the move changes the XY position
    pub fn is_planar(&self) -> bool {
        self.x.is_some() || self.y.is_some()
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut words = Vec::with_capacity(4);
        if let Some(x) = self.x {
            words.push(format!("X{:.3}", stable(x)));
        }
        if let Some(y) = self.y {
            words.push(format!("Y{:.3}", stable(y)));
        }
        if let Some(z) = self.z {
            words.push(format!("Z{:.3}", stable(z)));
        }
        if let Some(feed) = self.feed {
            words.push(format!("F{:.0}", feed));
        }
        write!(f, "{}", words.join(" "))
    }
}

/// Round to the rendered precision and fold negative zero
fn stable(value: f64) -> f64 {
    let rounded = (value * 1000.0).round() / 1000.0;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// A single line of the motion program
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// G90
    AbsolutePositioning,
    /// G21
    Millimeters,
    /// G0 rapid move
    Rapid(Move),
    /// G1 linear move
    Linear(Move),
    /// M204 with the same value for print and travel moves
    SetAcceleration(f64),
    /// M400: wait for the motion queue to drain
    FinishMoves,
    /// M2
    ProgramEnd,
    /// `; text`
    Comment(String),
    /// Empty line
    Blank,
}

impl Instruction {
    pub fn comment(text: impl Into<String>) -> Self {
        Self::Comment(text.into())
    }

    /// The move carried by a G0/G1 instruction
    pub fn motion(&self) -> Option<&Move> {
        match self {
            Self::Rapid(m) | Self::Linear(m) => Some(m),
            _ => None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AbsolutePositioning => write!(f, "G90"),
            Self::Millimeters => write!(f, "G21"),
            Self::Rapid(m) => write!(f, "G0 {}", m),
            Self::Linear(m) => write!(f, "G1 {}", m),
            Self::SetAcceleration(a) => write!(f, "M204 P{:.0} T{:.0}", a, a),
            Self::FinishMoves => write!(f, "M400"),
            Self::ProgramEnd => write!(f, "M2"),
            Self::Comment(text) => write!(f, "; {}", text),
            Self::Blank => Ok(()),
        }
    }
}

/// Counts gathered from a rendered program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreamStats {
    /// G1 moves with an X or Y target (strokes and spiral agitation)
    pub linear_xy_moves: usize,
    /// G0 moves with an X or Y target
    pub rapid_xy_moves: usize,
    /// Replenishment cycle markers
    pub replenishment_cycles: usize,
    /// Total lines including comments and blanks
    pub lines: usize,
}

/// Ordered, append-only motion program
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstructionStream {
    instructions: Vec<Instruction>,
}

impl InstructionStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    pub fn comment(&mut self, text: impl Into<String>) {
        self.instructions.push(Instruction::comment(text));
    }

    pub fn blank(&mut self) {
        self.instructions.push(Instruction::Blank);
    }

    /// Move all instructions of `other` onto the end of this stream
    pub fn append(&mut self, other: InstructionStream) {
        self.instructions.extend(other.instructions);
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Instruction> {
        self.instructions.iter()
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Render the program, one instruction per line
    pub fn render(&self) -> String {
        let mut out = String::new();
        for instruction in &self.instructions {
            out.push_str(&instruction.to_string());
            out.push('\n');
        }
        out
    }

    pub fn stats(&self) -> StreamStats {
        let mut stats = StreamStats {
            lines: self.instructions.len(),
            ..StreamStats::default()
        };
        for instruction in &self.instructions {
            match instruction {
                Instruction::Linear(m) if m.is_planar() => stats.linear_xy_moves += 1,
                Instruction::Rapid(m) if m.is_planar() => stats.rapid_xy_moves += 1,
                Instruction::Comment(text) if text == REPLENISHMENT_MARKER => {
                    stats.replenishment_cycles += 1
                }
                _ => {}
            }
        }
        stats
    }
}

impl fmt::Display for InstructionStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl Extend<Instruction> for InstructionStream {
    fn extend<I: IntoIterator<Item = Instruction>>(&mut self, iter: I) {
        self.instructions.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_formatting() {
        let rapid = Instruction::Rapid(Move::xy(10.0, 20.5).with_z(4.6));
        assert_eq!(rapid.to_string(), "G0 X10.000 Y20.500 Z4.600");

        let plunge = Instruction::Linear(Move::z(0.0).with_feed(2500.0));
        assert_eq!(plunge.to_string(), "G1 Z0.000 F2500");

        let feed = Instruction::Linear(Move::feed(12000.0));
        assert_eq!(feed.to_string(), "G1 F12000");
    }

    #[test]
    fn test_negative_zero_is_folded() {
        let m = Instruction::Linear(Move::xy(-0.0, -0.0001));
        assert_eq!(m.to_string(), "G1 X0.000 Y0.000");
    }

    #[test]
    fn test_machine_words() {
        assert_eq!(Instruction::SetAcceleration(200.0).to_string(), "M204 P200 T200");
        assert_eq!(Instruction::FinishMoves.to_string(), "M400");
        assert_eq!(Instruction::ProgramEnd.to_string(), "M2");
        assert_eq!(Instruction::comment("hello").to_string(), "; hello");
        assert_eq!(Instruction::Blank.to_string(), "");
    }

    #[test]
    fn test_render_and_stats() {
        let mut stream = InstructionStream::new();
        stream.push(Instruction::AbsolutePositioning);
        stream.comment(REPLENISHMENT_MARKER);
        stream.push(Instruction::Rapid(Move::xy(1.0, 1.0)));
        stream.push(Instruction::Linear(Move::xy(2.0, 1.0)));
        stream.push(Instruction::Linear(Move::z(0.0)));
        stream.blank();

        assert_eq!(
            stream.render(),
            "G90\n; --- replenishment cycle ---\nG0 X1.000 Y1.000\nG1 X2.000 Y1.000\nG1 Z0.000\n\n"
        );

        let stats = stream.stats();
        assert_eq!(stats.linear_xy_moves, 1);
        assert_eq!(stats.rapid_xy_moves, 1);
        assert_eq!(stats.replenishment_cycles, 1);
        assert_eq!(stats.lines, 6);
    }
}
