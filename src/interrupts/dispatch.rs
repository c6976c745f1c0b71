//! Despacho de exceções e IRQs.
//!
//! O `InterruptManager` junta o registro (atrás de um `Spinlock`), o
//! controlador de interrupções e o hook opcional do scheduler. Os stubs de
//! entrada chamam `dispatch_fault` / `dispatch_irq` com o `TrapFrame` montado
//! na stack de trap; o valor retornado é o stack pointer com que o stub
//! restaura os registradores.
//!
//! Em ambos os casos a cadeia é copiada sob o lock e os handlers rodam
//! depois que ele foi liberado.

use super::registry::{Chain, HandlerSlot, InterruptRegistry, Isr};
use super::{
    exception_name, irq_vector, is_irq_vector, InterruptController, IrqError, IrqResult,
    DOUBLE_FAULT_VECTOR, IRQ_BASE, IRQ_COUNT, SYSCALL_VECTOR, TIMER_IRQ,
};
use crate::arch::{Cpu, CpuOps, TrapFrame};
use crate::sync::Spinlock;

/// Hook do scheduler executado a cada tick do timer (IRQ 0).
///
/// Recebe o stack pointer atual e devolve o stack pointer a restaurar.
pub type SchedulerHook = fn(usize) -> usize;

/// Gerenciador de interrupções do kernel.
pub struct InterruptManager<P: InterruptController> {
    registry: Spinlock<InterruptRegistry>,
    controller: P,
    scheduler: Spinlock<Option<SchedulerHook>>,
}

impl<P: InterruptController> InterruptManager<P> {
    pub const fn new(controller: P) -> Self {
        Self {
            registry: Spinlock::new(InterruptRegistry::new()),
            controller,
            scheduler: Spinlock::new(None),
        }
    }

    pub fn controller(&self) -> &P {
        &self.controller
    }

    // =========================================================================
    // REGISTRO
    // =========================================================================

    /// Registra `handler` no vetor. Retorna a posição na cadeia.
    pub fn attach(&self, vector: u8, handler: Isr) -> IrqResult<u32> {
        self.registry.lock().attach(vector, handler)
    }

    /// Remove `handler` do vetor. `false` se não estava registrado.
    pub fn detach(&self, vector: u8, handler: Isr) -> bool {
        self.registry.lock().detach(vector, handler)
    }

    /// Registra `handler` na linha de IRQ `irq` (vetor `IRQ_BASE + irq`).
    pub fn attach_irq(&self, irq: u8, handler: Isr) -> IrqResult<u32> {
        check_irq(irq)?;
        self.attach(irq_vector(irq), handler)
    }

    pub fn detach_irq(&self, irq: u8, handler: Isr) -> IrqResult<bool> {
        check_irq(irq)?;
        Ok(self.detach(irq_vector(irq), handler))
    }

    /// Cópia do slot da cabeça da cadeia do vetor.
    pub fn lookup_head(&self, vector: u8) -> Option<HandlerSlot> {
        self.registry.lock().lookup_head(vector).copied()
    }

    /// Snapshot da cadeia do vetor.
    pub fn chain(&self, vector: u8) -> Chain {
        self.registry.lock().chain(vector)
    }

    /// Instala (ou remove, com `None`) o hook do scheduler.
    pub fn set_scheduler_hook(&self, hook: Option<SchedulerHook>) {
        *self.scheduler.lock() = hook;
    }

    // =========================================================================
    // LINHAS DE IRQ
    // =========================================================================

    pub fn enable_irq(&self, irq: u8) -> IrqResult<()> {
        check_irq(irq)?;
        self.controller.enable_line(irq);
        Ok(())
    }

    pub fn disable_irq(&self, irq: u8) -> IrqResult<()> {
        check_irq(irq)?;
        self.controller.disable_line(irq);
        Ok(())
    }

    /// Mascara todas as linhas do controlador.
    pub fn disable_irqs(&self) {
        self.controller.disable_all();
    }

    // =========================================================================
    // DESPACHO
    // =========================================================================

    /// Despacha uma exceção da CPU (vetores 0..32) ou uma syscall (0x80).
    ///
    /// Os handlers registrados rodam sempre, em ordem. Depois disso o trap é
    /// fatal se não havia handler, se é um double fault ou se o vetor não
    /// pertence à faixa de exceções (exceto a syscall): o erro é logado,
    /// os registradores despejados e a CPU travada.
    pub fn dispatch_fault(&self, frame: &mut TrapFrame) -> usize {
        let vector = frame.vector();
        let chain = self.chain(vector);

        let fatal = chain.is_empty()
            || vector == DOUBLE_FAULT_VECTOR
            || (vector >= IRQ_BASE && vector != SYSCALL_VECTOR);

        for handler in chain.iter() {
            handler(frame);
        }

        if fatal {
            unhandled(frame);
        }

        frame_address(frame)
    }

    /// Despacha uma IRQ de hardware (vetores `IRQ_BASE..IRQ_BASE + 16`).
    ///
    /// IRQs espúrias são apenas anotadas. Na IRQ 0 o hook do scheduler roda
    /// antes dos handlers e pode trocar o stack pointer retornado.
    pub fn dispatch_irq(&self, frame: &mut TrapFrame) -> usize {
        let vector = frame.vector();
        if !is_irq_vector(vector) {
            crate::kerror!("(IRQ) Vetor fora da faixa de IRQs: ", vector);
            unhandled(frame);
        }
        let irq = vector - IRQ_BASE;

        if self.controller.acknowledge(vector) {
            crate::knotice!("(IRQ) IRQ espuria ignorada: ", irq);
            return frame_address(frame);
        }

        let mut esp = frame_address(frame);

        if irq == TIMER_IRQ {
            let hook = *self.scheduler.lock();
            if let Some(schedule) = hook {
                esp = schedule(esp);
            }
        }

        let chain = self.chain(vector);
        if chain.is_empty() {
            if irq != TIMER_IRQ {
                crate::kwarn!("No handler for IRQ #", irq);
            }
            return esp;
        }

        for handler in chain.iter() {
            handler(frame);
        }

        esp
    }
}

#[inline]
fn check_irq(irq: u8) -> IrqResult<()> {
    if irq < IRQ_COUNT {
        Ok(())
    } else {
        Err(IrqError::InvalidIrq)
    }
}

#[inline]
fn frame_address(frame: &TrapFrame) -> usize {
    frame as *const TrapFrame as usize
}

/// Trap sem tratamento: loga, despeja os registradores e trava a CPU.
fn unhandled(frame: &TrapFrame) -> ! {
    let vector = frame.vector();

    crate::kerror!("Unhandled exception #", vector);
    if let Some(name) = exception_name(vector) {
        crate::kerror!(name);
    }
    frame.dump();

    Cpu::hang()
}
