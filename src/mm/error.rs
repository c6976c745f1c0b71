//! Tipos de Erro do Subsistema de Memória

/// Erros do subsistema de memória
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MmError {
    /// Sem memória disponível (heap esgotado ou limite de placement)
    OutOfMemory,
    /// Operação que exige o heap antes de ele ser instalado
    NotInitialized,
    /// Heap (ou cursor de placement) já configurado
    AlreadyInitialized,
    /// Endereço sem página mapeada no espaço do kernel
    NotMapped,
    /// Parâmetro inválido
    InvalidParameter,
}

impl MmError {
    /// Retorna descrição legível do erro
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OutOfMemory => "OOM: sem memória disponível",
            Self::NotInitialized => "Heap do kernel não instalado",
            Self::AlreadyInitialized => "Alocador já inicializado",
            Self::NotMapped => "Região não mapeada",
            Self::InvalidParameter => "Parâmetro inválido",
        }
    }
}

impl core::fmt::Display for MmError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tipo Result específico para operações de memória
pub type MmResult<T> = Result<T, MmError>;
