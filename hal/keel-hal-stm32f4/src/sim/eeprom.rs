use std::vec;
use std::vec::Vec;

use super::SimDevice;

/// Serial EEPROM with a two-byte big-endian memory address
///
/// After a write-direction select the first two bytes load the address
/// pointer and every following byte is stored at the pointer. Reads
/// return the byte at the pointer. The pointer advances after every data
/// byte and wraps at the end of the array.
#[derive(Debug, Clone)]
pub struct SimEeprom {
    address: u8,
    memory: Vec<u8>,
    pointer: usize,
    address_bytes: u8,
    high: u8,
}

impl SimEeprom {
    /// Erased (0xFF) device of `size` bytes at 7-bit `address`
    pub fn new(address: u8, size: usize) -> Self {
        Self {
            address,
            memory: vec![0xFF; size.max(1)],
            pointer: 0,
            address_bytes: 2,
            high: 0,
        }
    }

    pub fn memory(&self) -> &[u8] {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut [u8] {
        &mut self.memory
    }

    /// Current address pointer
    pub fn pointer(&self) -> usize {
        self.pointer
    }

    pub fn set_pointer(&mut self, pointer: usize) {
        self.pointer = pointer % self.memory.len();
    }

    fn advance(&mut self) {
        self.pointer = (self.pointer + 1) % self.memory.len();
    }
}

impl SimDevice for SimEeprom {
    fn address(&self) -> u8 {
        self.address
    }

    fn start(&mut self, read: bool) {
        if !read {
            self.address_bytes = 0;
        }
    }

    fn write(&mut self, byte: u8) -> bool {
        match self.address_bytes {
            0 => {
                self.high = byte;
                self.address_bytes = 1;
            }
            1 => {
                let pointer = u16::from_be_bytes([self.high, byte]) as usize;
                self.set_pointer(pointer);
                self.address_bytes = 2;
            }
            _ => {
                self.memory[self.pointer] = byte;
                self.advance();
            }
        }
        true
    }

    fn read(&mut self) -> u8 {
        let byte = self.memory[self.pointer];
        self.advance();
        byte
    }
}
