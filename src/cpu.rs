//! A small model of the Hack CPU for running assembled programs in tests.
use crate::assembler::Assembler;
use crate::error::Result;

pub struct Cpu {
    pub ram: Vec<i16>,
    rom: Vec<u16>,
    pub a: i16,
    pub d: i16,
    pub pc: usize,
}

impl Cpu {
    /// Assembles `source` and loads it into ROM with all registers cleared.
    pub fn load(source: &str) -> Result<Self> {
        let rom = Assembler::new().run(source)?.iter().map(|e| e.word).collect();
        Ok(Cpu { ram: vec![0; 1 << 16], rom, a: 0, d: 0, pc: 0 })
    }

    /// Runs until the program counter leaves the program or `limit`
    /// instructions have executed. Returns the number executed.
    pub fn run(&mut self, limit: usize) -> usize {
        for executed in 0..limit {
            if self.pc >= self.rom.len() {
                return executed;
            }
            self.step();
        }
        limit
    }

    pub fn step(&mut self) {
        let word = self.rom[self.pc];
        if word & 0x8000 == 0 {
            self.a = word as i16;
            self.pc += 1;
            return;
        }

        // Memory writes and jumps use A as it was before this instruction.
        let address = self.a as u16 as usize;
        let y = if word & 0x1000 != 0 { self.ram[address] } else { self.a };
        let out = alu(self.d, y, (word >> 6) & 0x3F);

        if word & 0x08 != 0 {
            self.ram[address] = out;
        }
        if word & 0x10 != 0 {
            self.d = out;
        }
        if word & 0x20 != 0 {
            self.a = out;
        }

        let jump = (word & 0b100 != 0 && out < 0)
            || (word & 0b010 != 0 && out == 0)
            || (word & 0b001 != 0 && out > 0);
        self.pc = if jump { address } else { self.pc + 1 };
    }
}

/// The six ALU control bits, zx nx zy ny f no, from high to low.
fn alu(x: i16, y: i16, control: u16) -> i16 {
    let mut x = if control & 0b100000 != 0 { 0 } else { x };
    if control & 0b010000 != 0 {
        x = !x;
    }
    let mut y = if control & 0b001000 != 0 { 0 } else { y };
    if control & 0b000100 != 0 {
        y = !y;
    }
    let out = if control & 0b000010 != 0 { x.wrapping_add(y) } else { x & y };
    if control & 0b000001 != 0 {
        !out
    } else {
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add() {
        let mut cpu = Cpu::load("@2\nD=A\n@3\nD=D+A\n@0\nM=D").unwrap();
        assert_eq!(cpu.run(100), 6);
        assert_eq!(cpu.ram[0], 5);
    }

    #[test]
    fn test_jump_and_loop() {
        // R1 = R0 * 3 by repeated addition.
        let source = "
            @R1
            M=0
            @3
            D=A
            @i
            M=D
        (LOOP)
            @i
            D=M
            @END
            D;JEQ
            @R0
            D=M
            @R1
            M=D+M
            @i
            M=M-1
            @LOOP
            0;JMP
        (END)
        ";
        let mut cpu = Cpu::load(source).unwrap();
        cpu.ram[0] = 14;
        cpu.run(1000);
        assert_eq!(cpu.ram[1], 42);
    }

    #[test]
    fn test_alu() {
        assert_eq!(alu(5, 9, 0b000010), 14); // D+A
        assert_eq!(alu(5, 9, 0b010011), -4); // D-A
        assert_eq!(alu(5, 9, 0b000111), 4); // A-D
        assert_eq!(alu(5, 9, 0b001111), -5); // -D
        assert_eq!(alu(5, 9, 0b111010), -1); // -1
        assert_eq!(alu(5, 9, 0b011111), 6); // D+1
    }
}
