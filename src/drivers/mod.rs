//! # Kernel Driver Layer
//!
//! Colaboradores de hardware do núcleo. Cada um fica atrás de uma interface
//! definida pelo subsistema que o consome.
//!
//! | Driver   | Arquivo      | Interface                          |
//! |----------|--------------|------------------------------------|
//! | Serial   | `serial.rs`  | Sink dos macros de log             |
//! | PIC      | `pic.rs`     | `interrupts::InterruptController`  |
//! | PIT      | `pit.rs`     | `core::time::TickSource`           |
//! | Device   | `device.rs`  | Contrato de leitura/escrita        |

pub mod device; // Contrato de dispositivo de bytes
pub mod pic; // 8259 PIC - Interrupções legacy
pub mod pit; // PIT 8254 - Timer do sistema
pub mod serial; // UART 16550 - Logs

#[cfg(test)]
mod test;
