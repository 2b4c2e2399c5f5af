//! Runs the whole chain from stack-machine source to binary text.
use crate::assembler;
use crate::error::Result;
use crate::translator::{self, parser::SourceFile, Config};

/// Translates `files` and assembles the result. Each stage starts from fresh state.
pub fn build(files: &[SourceFile], config: Config) -> Result<String> {
    let asm = translator::translate(files, config)?;
    let binary = assembler::assemble(&asm)?;
    debug!("built {} file(s) into {} word(s)", files.len(), binary.lines().count());
    Ok(binary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::Cpu;

    const TRUE: i16 = -1;
    const FALSE: i16 = 0;

    /// Translates a single file and runs it with the stack at 256.
    fn run(text: &str, steps: usize) -> Cpu {
        let asm = translator::translate(&[SourceFile::new("Test", text)], Config::default()).unwrap();
        let mut cpu = Cpu::load(&asm).unwrap();
        cpu.ram[0] = 256;
        cpu.run(steps);
        cpu
    }

    fn stack(cpu: &Cpu) -> Vec<i16> {
        cpu.ram[256..cpu.ram[0] as usize].to_vec()
    }

    #[test]
    fn test_build() {
        let files = vec![SourceFile::new("Main", "push constant 7\npush constant 8\nadd\n")];
        let binary = build(&files, Config::default()).unwrap();
        let words: Vec<&str> = binary.lines().collect();
        assert_eq!(words.len(), 7 + 7 + 13);
        assert_eq!(words[0], "0000000000000111");
        assert!(words.iter().all(|w| w.len() == 16));
        assert_eq!(build(&files, Config::default()), Ok(binary));
    }

    #[test]
    fn test_simple_add() {
        let cpu = run("push constant 7\npush constant 8\nadd", 1000);
        assert_eq!(stack(&cpu), vec![15]);
    }

    #[test]
    fn test_stack_test() {
        let source = "
            push constant 17
            push constant 17
            eq
            push constant 17
            push constant 16
            eq
            push constant 892
            push constant 891
            lt
            push constant 891
            push constant 892
            lt
            push constant 32767
            push constant 32766
            gt
            push constant 32766
            push constant 32767
            gt
            push constant 57
            push constant 31
            push constant 53
            add
            push constant 112
            sub
            neg
            and
            push constant 82
            or
            not
        ";
        let cpu = run(source, 10_000);
        assert_eq!(stack(&cpu), vec![TRUE, FALSE, FALSE, TRUE, TRUE, FALSE, -91]);
    }

    #[test]
    fn test_memory_segments() {
        let source = "
            push constant 10
            pop local 0
            push constant 21
            push constant 22
            pop argument 2
            pop argument 1
            push constant 36
            pop this 6
            push constant 42
            push constant 45
            pop that 5
            pop that 2
            push constant 510
            pop temp 6
            push local 0
            push that 5
            add
            push argument 1
            sub
            push this 6
            push this 6
            add
            sub
            push temp 6
            add
        ";
        let asm = translator::translate(&[SourceFile::new("Test", source)], Config::default()).unwrap();
        let mut cpu = Cpu::load(&asm).unwrap();
        cpu.ram[0] = 256;
        cpu.ram[1] = 300;
        cpu.ram[2] = 400;
        cpu.ram[3] = 3000;
        cpu.ram[4] = 3010;
        cpu.run(10_000);

        assert_eq!(cpu.ram[0], 257);
        assert_eq!(cpu.ram[256], 472);
        assert_eq!(cpu.ram[300], 10);
        assert_eq!(cpu.ram[401], 21);
        assert_eq!(cpu.ram[402], 22);
        assert_eq!(cpu.ram[3006], 36);
        assert_eq!(cpu.ram[3012], 42);
        assert_eq!(cpu.ram[3015], 45);
        assert_eq!(cpu.ram[11], 510);
    }

    #[test]
    fn test_pointer_and_static() {
        let source = "
            push constant 3030
            pop pointer 0
            push constant 3040
            pop pointer 1
            push constant 32
            pop this 2
            push constant 46
            pop that 6
            push pointer 0
            push pointer 1
            add
            push this 2
            sub
            push that 6
            add
            push constant 111
            pop static 8
            push static 8
        ";
        let cpu = run(source, 10_000);
        assert_eq!(cpu.ram[3], 3030);
        assert_eq!(cpu.ram[4], 3040);
        assert_eq!(cpu.ram[3032], 32);
        assert_eq!(cpu.ram[3046], 46);
        assert_eq!(cpu.ram[16], 111);
        assert_eq!(stack(&cpu), vec![6084, 111]);
    }

    #[test]
    fn test_static_files_do_not_collide() {
        let files = vec![
            SourceFile::new("Class1", "push constant 6\npop static 0\npush constant 8\npop static 1\n"),
            SourceFile::new("Class2", "push constant 23\npop static 0\npush constant 15\npop static 1\n"),
            SourceFile::new("Main", "push static 0\n"),
        ];
        let asm = translator::translate(&files, Config::default()).unwrap();
        let mut cpu = Cpu::load(&asm).unwrap();
        cpu.ram[0] = 256;
        cpu.run(10_000);
        assert_eq!(cpu.ram[16..21].to_vec(), vec![6, 8, 23, 15, 0]);
    }

    #[test]
    fn test_branching() {
        // Sums 1..=n for n in argument 0.
        let source = "
            push constant 0
            pop local 0
            label LOOP_START
            push argument 0
            push local 0
            add
            pop local 0
            push argument 0
            push constant 1
            sub
            pop argument 0
            push argument 0
            if-goto LOOP_START
            push local 0
        ";
        let asm = translator::translate(&[SourceFile::new("Test", source)], Config::default()).unwrap();
        let mut cpu = Cpu::load(&asm).unwrap();
        cpu.ram[0] = 256;
        cpu.ram[1] = 300;
        cpu.ram[2] = 400;
        cpu.ram[400] = 3;
        cpu.run(10_000);
        assert_eq!(cpu.ram[0], 257);
        assert_eq!(cpu.ram[256], 6);
    }

    #[test]
    fn test_function_calls() {
        let main = "
            function Main.fibonacci 0
            push argument 0
            push constant 2
            lt
            if-goto N_LT_2
            goto N_GE_2
            label N_LT_2
            push argument 0
            return
            label N_GE_2
            push argument 0
            push constant 2
            sub
            call Main.fibonacci 1
            push argument 0
            push constant 1
            sub
            call Main.fibonacci 1
            add
            return
        ";
        let sys = "
            function Sys.init 0
            push constant 4
            call Main.fibonacci 1
            pop static 0
            label WHILE
            goto WHILE
        ";
        let files = vec![SourceFile::new("Main", main), SourceFile::new("Sys", sys)];
        let config = Config { bootstrap: true, annotate: true };
        let asm = translator::translate(&files, config).unwrap();
        let mut cpu = Cpu::load(&asm).unwrap();
        cpu.run(100_000);
        // Sys.0 is the only variable.
        assert_eq!(cpu.ram[16], 3);
        // Sys.init's frame sits on top of the bootstrap call's saved frame.
        assert_eq!(cpu.ram[0], 261);
    }

    #[test]
    fn test_function_locals_are_zeroed() {
        let source = "
            function Sys.init 0
            push constant 5
            call Test.f 1
            pop static 0
            label HALT
            goto HALT
            function Test.f 2
            push local 0
            push local 1
            add
            push argument 0
            add
            return
        ";
        let files = vec![SourceFile::new("Test", source)];
        let asm = translator::translate(&files, Config { bootstrap: true, annotate: false }).unwrap();
        let mut cpu = Cpu::load(&asm).unwrap();
        // Garbage where the locals will live must not leak into the result.
        for cell in cpu.ram[256..400].iter_mut() {
            *cell = 99;
        }
        cpu.run(10_000);
        assert_eq!(cpu.ram[16], 5);
    }
}
