//! Static program checks
//!
//! Walks a program's code sequence once and rejects programs that would
//! certainly fault: undecodable words, branches into the middle of an
//! instruction, negative call argument counts, oversized variable stores and
//! global stores outside the variable store. The interpreter still checks everything at run time.

use std::collections::BTreeSet;

use crate::error::ProgramError;
use crate::instruction::Instruction;
use crate::program::Program;

/// Static checker over a single program
pub struct Verifier<'a> {
    program: &'a Program,
}

impl<'a> Verifier<'a> {
    /// Create a verifier for `program`
    pub fn new(program: &'a Program) -> Self {
        Self { program }
    }

    /// Run every check, stopping at the first finding
    pub fn verify(&self) -> Result<(), ProgramError> {
        self.program.check_limits()?;
        let instructions = self.program.disassemble()?;
        let boundaries: BTreeSet<usize> = instructions.iter().map(|(addr, _)| *addr).collect();

        if !boundaries.contains(&self.program.entry) {
            return Err(ProgramError::EntryOutOfRange {
                entry: self.program.entry,
                len: self.program.len(),
            });
        }

        for (address, inst) in &instructions {
            self.check_instruction(*address, inst, &boundaries)?;
        }

        Ok(())
    }

    fn check_instruction(
        &self,
        address: usize,
        inst: &Instruction,
        boundaries: &BTreeSet<usize>,
    ) -> Result<(), ProgramError> {
        if let Some(target) = inst.target().filter(|_| inst.opcode().is_branch()) {
            let aligned = usize::try_from(target)
                .map(|t| boundaries.contains(&t))
                .unwrap_or(false);
            if !aligned {
                return Err(ProgramError::MisalignedTarget { address, target });
            }
        }

        match *inst {
            Instruction::Call { argc, .. } if argc < 0 => {
                Err(ProgramError::NegativeArgumentCount { address, argc })
            }
            Instruction::StoreGlobal(slot) => {
                let size = self.program.datasize;
                match usize::try_from(slot) {
                    Ok(s) if s < size => Ok(()),
                    _ => Err(ProgramError::StorageOutOfRange {
                        address,
                        slot,
                        size,
                    }),
                }
            }
            _ => Ok(()),
        }
    }
}
