//! Contrato genérico de dispositivo.
//!
//! Drivers de caractere/bloco expõem leitura e escrita de bytes; a camada de
//! vnodes acessa dispositivos apenas por aqui (`fs::devnode`).

/// Dispositivo de bytes.
pub trait Device: Sync {
    /// Nome curto do dispositivo (ex: "ttyS0").
    fn name(&self) -> &str;

    /// Lê até `buf.len()` bytes. Retorna quantos foram lidos.
    fn read(&self, buf: &mut [u8]) -> usize;

    /// Escreve até `buf.len()` bytes. Retorna quantos foram escritos.
    fn write(&self, buf: &[u8]) -> usize;
}

/// Ponto de entrada de um driver: sonda o hardware e devolve o dispositivo,
/// ou `None` se ele não estiver presente.
pub type DriverInit = fn() -> Option<&'static dyn Device>;

/// Roda a inicialização de cada driver, entregando os dispositivos achados
/// a `register`. Retorna quantos foram encontrados.
pub fn probe_all(drivers: &[DriverInit], mut register: impl FnMut(&'static dyn Device)) -> usize {
    let mut found = 0;
    for init in drivers {
        match init() {
            Some(dev) => {
                crate::kdebug!("(DEV) Dispositivo encontrado");
                register(dev);
                found += 1;
            }
            None => crate::ktrace!("(DEV) Driver sem dispositivo"),
        }
    }
    found
}
