use crate::error::{MalformedProgramError, UnmatchedBracketKind};

/// One of the eight operators. Every other byte is a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Right,
    Left,
    Increment,
    Decrement,
    Output,
    Input,
    LoopStart,
    LoopEnd,
}

impl Instruction {
    pub fn decode(byte: u8) -> Option<Self> {
        Some(match byte {
            b'>' => Instruction::Right,
            b'<' => Instruction::Left,
            b'+' => Instruction::Increment,
            b'-' => Instruction::Decrement,
            b'.' => Instruction::Output,
            b',' => Instruction::Input,
            b'[' => Instruction::LoopStart,
            b']' => Instruction::LoopEnd,
            _ => return None,
        })
    }

    pub fn symbol(self) -> char {
        match self {
            Instruction::Right => '>',
            Instruction::Left => '<',
            Instruction::Increment => '+',
            Instruction::Decrement => '-',
            Instruction::Output => '.',
            Instruction::Input => ',',
            Instruction::LoopStart => '[',
            Instruction::LoopEnd => ']',
        }
    }
}

/// Validated program text with its bracket table.
///
/// The source ends at the first NUL byte if there is one. `jump_map[i]` holds the
/// partner of the bracket at `i`; it is `None` for every other position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    code: Vec<u8>,
    jump_map: Vec<Option<usize>>,
}

impl Program {
    /// Build the bracket table in one pass, rejecting unbalanced loops.
    pub fn new(source: &[u8]) -> Result<Self, MalformedProgramError> {
        let end = source.iter().position(|&b| b == 0).unwrap_or(source.len());
        let code = source[..end].to_vec();

        let mut jump_map: Vec<Option<usize>> = vec![None; code.len()];
        let mut stack: Vec<usize> = Vec::new();
        for (i, &byte) in code.iter().enumerate() {
            if byte == b'[' {
                stack.push(i);
            } else if byte == b']' {
                let Some(open_index) = stack.pop() else {
                    return Err(MalformedProgramError {
                        ip: i,
                        kind: UnmatchedBracketKind::Close,
                    });
                };
                jump_map[open_index] = Some(i);
                jump_map[i] = Some(open_index);
            }
        }

        if let Some(unmatched_open) = stack.last().copied() {
            return Err(MalformedProgramError {
                ip: unmatched_open,
                kind: UnmatchedBracketKind::Open,
            });
        }

        Ok(Self { code, jump_map })
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.code
    }

    /// Decoded instruction at `ip`, or `None` for comments and past-the-end.
    pub fn instruction(&self, ip: usize) -> Option<Instruction> {
        self.code.get(ip).copied().and_then(Instruction::decode)
    }

    /// Partner of the bracket at `ip`.
    pub fn partner(&self, ip: usize) -> Option<usize> {
        self.jump_map.get(ip).copied().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn nested_brackets_pair_up() {
        let program = Program::new(b"[[]-[]]").unwrap();
        assert_eq!(program.partner(0), Some(6));
        assert_eq!(program.partner(6), Some(0));
        assert_eq!(program.partner(1), Some(2));
        assert_eq!(program.partner(4), Some(5));
        assert_eq!(program.partner(3), None);
    }

    #[test]
    fn stray_close_is_reported_at_its_position() {
        let err = Program::new(b"+]").unwrap_err();
        assert_eq!(err.ip, 1);
        assert_eq!(err.kind, UnmatchedBracketKind::Close);
    }

    #[test]
    fn innermost_unclosed_open_is_reported() {
        let err = Program::new(b"[[]+[").unwrap_err();
        assert_eq!(err.ip, 4);
        assert_eq!(err.kind, UnmatchedBracketKind::Open);
    }

    #[test]
    fn nul_byte_terminates_source() {
        let program = Program::new(b"+-\0]]]").unwrap();
        assert_eq!(program.as_bytes(), b"+-");
    }

    #[test]
    fn comments_decode_to_none() {
        let program = Program::new(b"a+ \n").unwrap();
        assert_eq!(program.instruction(0), None);
        assert_eq!(program.instruction(1), Some(Instruction::Increment));
        assert_eq!(program.instruction(2), None);
        assert_eq!(program.instruction(99), None);
    }

    #[test]
    fn decode_and_symbol_agree() {
        for &b in b"><+-.,[]" {
            let instr = Instruction::decode(b).unwrap();
            assert_eq!(instr.symbol(), b as char);
        }
    }

    proptest! {
        #[test]
        fn balanced_programs_have_symmetric_tables(
            depths in prop::collection::vec(0usize..4, 0..16)
        ) {
            let mut src = String::new();
            for d in depths {
                src.push_str(&"[".repeat(d));
                src.push('+');
                src.push_str(&"]".repeat(d));
            }
            let program = Program::new(src.as_bytes()).unwrap();
            for i in 0..program.len() {
                if let Some(j) = program.partner(i) {
                    prop_assert_eq!(program.partner(j), Some(i));
                    prop_assert!(j < program.len());
                }
            }
        }

        #[test]
        fn arbitrary_bytes_never_panic(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
            if let Ok(program) = Program::new(&bytes) {
                let opens = program.as_bytes().iter().filter(|&&b| b == b'[').count();
                let closes = program.as_bytes().iter().filter(|&&b| b == b']').count();
                prop_assert_eq!(opens, closes);
            }
        }
    }
}
