//! Contexto global do kernel.
//!
//! `KERNEL` junta os subsistemas com estado compartilhado. É construído em
//! tempo de compilação (o registro de interrupções é grande demais para a
//! stack de boot) e configurado uma única vez por `Kernel::init`, antes de
//! as interrupções serem habilitadas.

use super::time::TIMER_FREQ;
use crate::drivers::pic::ChainedPics;
use crate::drivers::pit;
use crate::interrupts::{InterruptManager, IrqError, TIMER_IRQ};
use crate::mm::{KernelAllocator, LinkedHeap, MmError};
use crate::sys::Errno;
use spin::Once;

#[cfg(not(test))]
use crate::arch::TrapFrame;

/// Parâmetros de boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootConfig {
    /// Primeiro endereço virtual após a imagem do kernel
    pub kernel_end: usize,
    /// Base virtual onde a imagem está mapeada
    pub kernel_voffset: usize,
    /// Fim (exclusivo) da região de placement
    pub placement_limit: Option<usize>,
    /// Frequência do timer do sistema (Hz)
    pub timer_frequency: u32,
}

impl BootConfig {
    pub const fn new(kernel_end: usize, kernel_voffset: usize) -> Self {
        Self {
            kernel_end,
            kernel_voffset,
            placement_limit: None,
            timer_frequency: TIMER_FREQ,
        }
    }
}

/// Falhas da inicialização do kernel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitError {
    AlreadyInitialized,
    Memory(MmError),
    Interrupts(IrqError),
    Timer(Errno),
}

impl From<MmError> for InitError {
    fn from(e: MmError) -> Self {
        Self::Memory(e)
    }
}

impl From<IrqError> for InitError {
    fn from(e: IrqError) -> Self {
        Self::Interrupts(e)
    }
}

impl From<Errno> for InitError {
    fn from(e: Errno) -> Self {
        Self::Timer(e)
    }
}

/// Estado global do kernel.
pub struct Kernel {
    interrupts: InterruptManager<ChainedPics>,
    memory: KernelAllocator<LinkedHeap>,
    config: Once<BootConfig>,
}

impl Kernel {
    pub const fn new() -> Self {
        Self {
            interrupts: InterruptManager::new(ChainedPics::new()),
            memory: KernelAllocator::new(),
            config: Once::new(),
        }
    }

    pub fn interrupts(&self) -> &InterruptManager<ChainedPics> {
        &self.interrupts
    }

    pub fn memory(&self) -> &KernelAllocator<LinkedHeap> {
        &self.memory
    }

    pub fn config(&self) -> Option<&BootConfig> {
        self.config.get()
    }

    pub fn is_initialized(&self) -> bool {
        self.config.is_completed()
    }

    /// Frequência configurada do timer (padrão antes do `init`).
    pub fn timer_frequency(&self) -> u32 {
        self.config().map_or(TIMER_FREQ, |c| c.timer_frequency)
    }

    /// Inicializa o núcleo.
    ///
    /// 1. Cursor de placement no fim da imagem do kernel
    /// 2. IDT, PIC remapeado e PIT programado
    /// 3. Contador de ticks na IRQ 0
    ///
    /// Deve rodar com interrupções desabilitadas.
    pub fn init(&self, config: BootConfig) -> Result<(), InitError> {
        if self.is_initialized() {
            crate::kwarn!("(Kernel) init chamado mais de uma vez");
            return Err(InitError::AlreadyInitialized);
        }

        crate::drivers::serial::init();
        crate::kinfo!("(Kernel) Inicializando...");

        self.memory
            .setup(config.kernel_end, config.kernel_voffset, config.placement_limit)?;

        self.interrupts.attach_irq(TIMER_IRQ, pit::timer_tick)?;
        let frequency = self.init_hardware(&config)?;

        self.config.call_once(|| BootConfig {
            timer_frequency: frequency,
            ..config
        });

        crate::kok!("(Kernel) Núcleo pronto");
        Ok(())
    }

    #[cfg(not(test))]
    fn init_hardware(&self, config: &BootConfig) -> Result<u32, InitError> {
        #[cfg(target_arch = "x86")]
        // SAFETY: boot, interrupções desabilitadas, GDT do kernel carregada
        unsafe {
            crate::arch::x86::entry::init_idt();
        }

        self.interrupts.controller().init();
        let frequency = pit::init(config.timer_frequency)?;
        self.interrupts.enable_irq(TIMER_IRQ)?;

        Ok(frequency)
    }

    /// No host não há hardware: a frequência pedida é aceita como está.
    #[cfg(test)]
    fn init_hardware(&self, config: &BootConfig) -> Result<u32, InitError> {
        pit::divisor_for(config.timer_frequency)?;
        Ok(config.timer_frequency)
    }

    /// Desliga as linhas de IRQ antes de entregar a máquina.
    pub fn finish(&self) {
        self.interrupts.disable_irqs();
        crate::kinfo!("(Kernel) IRQs desabilitadas");
    }

    /// Reinicia a máquina pelo controlador de teclado.
    #[cfg(not(test))]
    pub fn reset(&self) -> ! {
        crate::kwarn!("(Kernel) Reiniciando...");
        self.finish();
        crate::arch::platform::Cpu::reset()
    }
}

pub static KERNEL: Kernel = Kernel::new();

// =============================================================================
// TRAMPOLINS CHAMADOS PELOS STUBS DE ENTRADA
// =============================================================================

/// Exceções e syscall. Retorna o stack pointer a restaurar.
#[cfg(not(test))]
#[no_mangle]
pub extern "C" fn isr_handler(frame: *mut TrapFrame) -> usize {
    // SAFETY: o stub passa o frame que acabou de montar na stack de trap
    let frame = unsafe { &mut *frame };
    KERNEL.interrupts().dispatch_fault(frame)
}

/// IRQs de hardware. Retorna o stack pointer a restaurar.
#[cfg(not(test))]
#[no_mangle]
pub extern "C" fn irq_handler(frame: *mut TrapFrame) -> usize {
    // SAFETY: idem
    let frame = unsafe { &mut *frame };
    KERNEL.interrupts().dispatch_irq(frame)
}
