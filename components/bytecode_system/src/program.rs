//! Program container - a code sequence plus its launch parameters
//!
//! Holds the integer code array, the entry address and the variable store
//! size a run needs, and converts it to and from loadable artifacts.

use core_types::Word;
use serde::{Deserialize, Serialize};

use crate::error::ProgramError;
use crate::instruction::Instruction;
use crate::verifier::Verifier;

/// Magic bytes at the start of a binary artifact
pub const MAGIC: &[u8; 4] = b"VMES";

/// Binary artifact format version
pub const FORMAT_VERSION: u8 = 1;

/// Largest variable store a program may declare, in words
pub const MAX_DATASIZE: usize = 1 << 20;

const HEADER_LEN: usize = 4 + 1 + 4 + 4 + 4;

/// A program ready to be loaded into the interpreter
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Program {
    /// Opcodes interleaved with their inline operands
    pub code: Vec<Word>,
    /// Address of the first instruction to execute
    #[serde(default)]
    pub entry: usize,
    /// Number of words in the variable store
    #[serde(default)]
    pub datasize: usize,
}

impl Program {
    /// Create an empty program with a variable store of `datasize` words
    pub fn new(datasize: usize) -> Self {
        Self {
            code: Vec::new(),
            entry: 0,
            datasize,
        }
    }

    /// Wrap an already assembled code sequence
    pub fn from_code(code: Vec<Word>, entry: usize, datasize: usize) -> Self {
        Self {
            code,
            entry,
            datasize,
        }
    }

    /// Set the entry address
    pub fn with_entry(mut self, entry: usize) -> Self {
        self.entry = entry;
        self
    }

    /// Append an instruction and return its address
    pub fn emit(&mut self, inst: Instruction) -> usize {
        let address = self.code.len();
        inst.encode(&mut self.code);
        address
    }

    /// Address the next emitted instruction will get
    pub fn here(&self) -> usize {
        self.code.len()
    }

    /// Number of code words
    pub fn len(&self) -> usize {
        self.code.len()
    }

    /// Check whether the program has no code
    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// Overwrite operand `index` of the instruction at `address`
    ///
    /// Used to resolve forward branches once their target is known.
    pub fn patch_operand(
        &mut self,
        address: usize,
        index: usize,
        value: Word,
    ) -> Result<(), ProgramError> {
        let (inst, _) = Instruction::decode(&self.code, address)
            .map_err(|source| ProgramError::Decode { address, source })?;
        if index >= inst.opcode().arity() {
            return Err(ProgramError::NoSuchOperand { address, index });
        }
        self.code[address + 1 + index] = value;
        Ok(())
    }

    /// Decode the whole code sequence, front to back
    pub fn disassemble(&self) -> Result<Vec<(usize, Instruction)>, ProgramError> {
        let mut out = Vec::new();
        let mut address = 0;
        while address < self.code.len() {
            let (inst, next) = Instruction::decode(&self.code, address)
                .map_err(|source| ProgramError::Decode { address, source })?;
            out.push((address, inst));
            address = next;
        }
        Ok(out)
    }

    /// Render the disassembly, one instruction per line
    ///
    /// The entry instruction is marked with `>`.
    pub fn listing(&self) -> Result<String, ProgramError> {
        let mut text = String::new();
        for (address, inst) in self.disassemble()? {
            let marker = if address == self.entry { '>' } else { ' ' };
            text.push_str(&format!("{}{:04}  {}\n", marker, address, inst));
        }
        Ok(text)
    }

    /// Run the static checks
    pub fn validate(&self) -> Result<(), ProgramError> {
        Verifier::new(self).verify()
    }

    /// Reject a declared storage size the interpreter will not allocate
    pub fn check_limits(&self) -> Result<(), ProgramError> {
        if self.datasize > MAX_DATASIZE {
            return Err(ProgramError::StorageTooLarge {
                datasize: self.datasize,
                max: MAX_DATASIZE,
            });
        }
        Ok(())
    }

    /// Serialize to the binary artifact format
    ///
    /// Fails if a header field does not fit in a `u32`.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ProgramError> {
        let entry = header_field(self.entry, "entry address")?;
        let datasize = header_field(self.datasize, "storage size")?;
        let len = header_field(self.code.len(), "code length")?;

        let mut bytes = Vec::with_capacity(HEADER_LEN + self.code.len() * 4);

        // Magic number
        bytes.extend_from_slice(MAGIC);

        // Version
        bytes.push(FORMAT_VERSION);

        bytes.extend_from_slice(&entry.to_le_bytes());
        bytes.extend_from_slice(&datasize.to_le_bytes());
        bytes.extend_from_slice(&len.to_le_bytes());

        for word in &self.code {
            bytes.extend_from_slice(&word.to_le_bytes());
        }

        Ok(bytes)
    }

    /// Deserialize from the binary artifact format
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProgramError> {
        if bytes.len() < HEADER_LEN {
            return Err(ProgramError::Truncated("program header"));
        }

        // Check magic number
        if &bytes[0..4] != MAGIC {
            return Err(ProgramError::BadMagic);
        }

        // Check version
        if bytes[4] != FORMAT_VERSION {
            return Err(ProgramError::UnsupportedVersion(bytes[4]));
        }

        let mut offset = 5;
        let entry = read_u32(bytes, &mut offset, "entry address")? as usize;
        let datasize = read_u32(bytes, &mut offset, "storage size")? as usize;
        let len = read_u32(bytes, &mut offset, "code length")? as usize;

        let mut code = Vec::with_capacity(len.min(bytes.len() / 4));
        for _ in 0..len {
            code.push(read_u32(bytes, &mut offset, "code word")? as Word);
        }

        if offset != bytes.len() {
            return Err(ProgramError::TrailingBytes(bytes.len() - offset));
        }

        let program = Self {
            code,
            entry,
            datasize,
        };
        program.check_limits()?;
        Ok(program)
    }

    /// Serialize to the JSON artifact format
    pub fn to_json(&self) -> Result<String, ProgramError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from the JSON artifact format
    pub fn from_json(text: &str) -> Result<Self, ProgramError> {
        let program: Self = serde_json::from_str(text)?;
        program.check_limits()?;
        Ok(program)
    }

    /// The sample program: store 6 and 69 in turn into slot 0, print each
    /// back, then pause and halt
    pub fn demo() -> Self {
        const STATE: Word = 0;

        let mut program = Program::new(1);
        program.emit(Instruction::Const(6));
        program.emit(Instruction::StoreGlobal(STATE));
        program.emit(Instruction::Const(STATE));
        program.emit(Instruction::LoadGlobal);
        program.emit(Instruction::Print);
        program.emit(Instruction::Const(69));
        program.emit(Instruction::StoreGlobal(STATE));
        program.emit(Instruction::Const(STATE));
        program.emit(Instruction::LoadGlobal);
        program.emit(Instruction::Print);
        program.emit(Instruction::Pause);
        program.emit(Instruction::Halt);
        program
    }
}

fn header_field(value: usize, what: &'static str) -> Result<u32, ProgramError> {
    u32::try_from(value).map_err(|_| ProgramError::FieldTooLarge(what))
}

fn read_u32(bytes: &[u8], offset: &mut usize, what: &'static str) -> Result<u32, ProgramError> {
    let end = *offset + 4;
    let chunk: [u8; 4] = bytes
        .get(*offset..end)
        .and_then(|s| s.try_into().ok())
        .ok_or(ProgramError::Truncated(what))?;
    *offset = end;
    Ok(u32::from_le_bytes(chunk))
}
