//! Interface Abstrata de CPU (HAL).
//! Define as operações de CPU das quais o núcleo depende. A implementação
//! real é `arch::x86::X86Cpu`; em testes, `arch::test::MockCpu`.

pub trait CpuOps {
    /// Para a execução da CPU até a próxima interrupção (instrução HLT).
    fn halt();

    /// Desabilita interrupções globalmente (CLI).
    /// Crítico para seções atômicas no kernel.
    fn disable_interrupts();

    /// Habilita interrupções globalmente (STI).
    fn enable_interrupts();

    /// Verifica se as interrupções estão habilitadas (EFLAGS.IF).
    fn are_interrupts_enabled() -> bool;

    /// Entra em loop infinito de halt com interrupções desabilitadas.
    /// Usado em falhas irrecuperáveis (exceção sem handler, double fault).
    fn hang() -> ! {
        Self::disable_interrupts();
        loop {
            Self::halt();
        }
    }
}
