/// Arquivo: x86/frame.rs
///
/// Propósito: Snapshot de registradores montado pelos stubs de entrada.
///
/// Detalhes de Implementação:
/// - Layout i386: segmentos empilhados pelo stub, `pusha`, vetor + código de
///   erro, e o frame de hardware (`eip cs eflags useresp ss`).
/// - Deve corresponder EXATAMENTE à ordem de push em `entry.rs`.
/// - Vive na stack de trap apenas durante o despacho.

/// Estado salvo dos registradores no momento da interrupção.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrapFrame {
    // Segmentos empilhados pelo stub comum
    pub gs: u32,
    pub fs: u32,
    pub es: u32,
    pub ds: u32,

    // pusha
    pub edi: u32,
    pub esi: u32,
    pub ebp: u32,
    pub esp: u32,
    pub ebx: u32,
    pub edx: u32,
    pub ecx: u32,
    pub eax: u32,

    // Empilhados pelo stub específico do vetor
    pub int_no: u32,
    pub err_code: u32,

    // Frame de Hardware
    pub eip: u32,
    pub cs: u32,
    pub eflags: u32,
    pub useresp: u32,
    pub ss: u32,
}

impl TrapFrame {
    /// Cria um frame zerado para o vetor indicado.
    pub const fn for_vector(vector: u8) -> Self {
        Self {
            gs: 0,
            fs: 0,
            es: 0,
            ds: 0,
            edi: 0,
            esi: 0,
            ebp: 0,
            esp: 0,
            ebx: 0,
            edx: 0,
            ecx: 0,
            eax: 0,
            int_no: vector as u32,
            err_code: 0,
            eip: 0,
            cs: 0,
            eflags: 0,
            useresp: 0,
            ss: 0,
        }
    }

    /// Vetor que originou o trap.
    #[inline]
    pub fn vector(&self) -> u8 {
        self.int_no as u8
    }

    /// Despeja todos os registradores no log de erro.
    ///
    /// Formato de diagnóstico, não estável.
    pub fn dump(&self) {
        crate::klog!("eax: ", self.eax, " ebx: ", self.ebx);
        crate::knl!();
        crate::klog!("ecx: ", self.ecx, " edx: ", self.edx);
        crate::knl!();
        crate::klog!("esi: ", self.esi, " edi: ", self.edi);
        crate::knl!();
        crate::klog!("ebp: ", self.ebp, " esp: ", self.esp);
        crate::knl!();
        crate::klog!("eip: ", self.eip, " efl: ", self.eflags);
        crate::knl!();
        crate::klog!("ss: ", self.ss, " cs: ", self.cs);
        crate::klog!(" ds: ", self.ds);
        crate::knl!();
        crate::klog!("es: ", self.es, " fs: ", self.fs);
        crate::klog!(" gs: ", self.gs);
        crate::knl!();
        crate::klog!("err: ", self.err_code, " usp: ", self.useresp);
        crate::knl!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::mem::{offset_of, size_of};

    #[test]
    fn layout_matches_entry_stub() {
        assert_eq!(size_of::<TrapFrame>(), 19 * 4);
        assert_eq!(offset_of!(TrapFrame, edi), 16);
        assert_eq!(offset_of!(TrapFrame, int_no), 48);
        assert_eq!(offset_of!(TrapFrame, eip), 56);
    }

    #[test]
    fn dump_lists_registers() {
        let mut frame = TrapFrame::for_vector(14);
        frame.eax = 0xdead_beef;
        crate::drivers::serial::take_captured();

        frame.dump();

        let out = crate::drivers::serial::take_captured();
        assert!(out.contains("eax: 0xdeadbeef"));
        assert!(out.contains("eip: "));
        assert_eq!(frame.vector(), 14);
    }
}
