//! Registro de handlers de interrupção.
//!
//! Cada vetor tem um pool fixo de `MAX_HANDLERS` slots. Os slots ocupados
//! formam uma lista duplamente encadeada cujos links são índices dentro do
//! pool do próprio vetor (`NIL` = sem vizinho). Slots nunca mudam de lugar,
//! então remover a cabeça só precisa copiar o índice do sucessor.
//!
//! O registro em si não sincroniza nada: quem o usa (`InterruptManager`)
//! o mantém atrás de um `Spinlock`, que também desabilita interrupções.

use super::{IrqError, IrqResult, IDT_NUM_ENTRIES, MAX_HANDLERS};
use crate::arch::TrapFrame;

/// Handler de interrupção registrado pelo kernel.
///
/// Recebe o snapshot de registradores e pode alterá-lo no lugar.
pub type Isr = fn(&mut TrapFrame);

/// Índice de slot inexistente
pub const NIL: u8 = u8::MAX;

/// Um registro (vetor, handler) dentro do pool do vetor.
#[derive(Clone, Copy)]
pub struct HandlerSlot {
    handler: Option<Isr>,
    index: u32,
    vector: u8,
    prev: u8,
    next: u8,
}

impl HandlerSlot {
    const EMPTY: Self = Self {
        handler: None,
        index: 0,
        vector: 0,
        prev: NIL,
        next: NIL,
    };

    pub fn handler(&self) -> Option<Isr> {
        self.handler
    }

    /// Posição na cadeia (1 para o primeiro registro de uma cadeia vazia).
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn vector(&self) -> u8 {
        self.vector
    }

    pub fn is_free(&self) -> bool {
        self.handler.is_none()
    }
}

impl core::fmt::Debug for HandlerSlot {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HandlerSlot")
            .field("vector", &self.vector)
            .field("index", &self.index)
            .field("handler", &self.handler.map(|h| h as usize))
            .field("prev", &self.prev)
            .field("next", &self.next)
            .finish()
    }
}

/// Compara handlers pelo endereço da função.
#[inline]
fn same_handler(a: Isr, b: Isr) -> bool {
    a as usize == b as usize
}

/// Pools de handlers + cursor de cabeça de cada vetor.
pub struct InterruptRegistry {
    slots: [[HandlerSlot; MAX_HANDLERS]; IDT_NUM_ENTRIES],
    heads: [u8; IDT_NUM_ENTRIES],
}

impl InterruptRegistry {
    pub const fn new() -> Self {
        Self {
            slots: [[HandlerSlot::EMPTY; MAX_HANDLERS]; IDT_NUM_ENTRIES],
            heads: [NIL; IDT_NUM_ENTRIES],
        }
    }

    /// Anexa `handler` ao final da cadeia de `vector`.
    ///
    /// Usa o primeiro slot livre do pool (busca linear). Retorna a posição
    /// atribuída na cadeia. Com o pool cheio nada muda e o erro é reportado.
    pub fn attach(&mut self, vector: u8, handler: Isr) -> IrqResult<u32> {
        let v = vector as usize;

        let Some(free) = self.slots[v].iter().position(HandlerSlot::is_free) else {
            crate::kwarn!("(IRQ) attach: pool de handlers cheio no vetor ", vector);
            return Err(IrqError::PoolExhausted);
        };
        let free = free as u8;

        let tail = self.tail(vector);
        let index = match tail {
            NIL => 1,
            t => self.slots[v][t as usize].index + 1,
        };

        self.slots[v][free as usize] = HandlerSlot {
            handler: Some(handler),
            index,
            vector,
            prev: tail,
            next: NIL,
        };

        if tail == NIL {
            self.heads[v] = free;
        } else {
            self.slots[v][tail as usize].next = free;
        }

        crate::ktrace!("(IRQ) attach: handler registrado no vetor ", vector);
        Ok(index)
    }

    /// Remove `handler` da cadeia de `vector`.
    ///
    /// A busca vai da cauda para a cabeça, então entre registros duplicados
    /// o mais recente sai primeiro. Cadeia vazia ou handler ausente: `false`.
    pub fn detach(&mut self, vector: u8, handler: Isr) -> bool {
        let v = vector as usize;

        let mut cursor = self.tail(vector);
        while cursor != NIL {
            let slot = self.slots[v][cursor as usize];
            if slot.handler.is_some_and(|h| same_handler(h, handler)) {
                if slot.prev == NIL {
                    // Removendo a cabeça: o sucessor (ou NIL) vira a nova cabeça
                    self.heads[v] = slot.next;
                } else {
                    self.slots[v][slot.prev as usize].next = slot.next;
                }
                if slot.next != NIL {
                    self.slots[v][slot.next as usize].prev = slot.prev;
                }

                self.slots[v][cursor as usize] = HandlerSlot::EMPTY;
                crate::ktrace!("(IRQ) detach: handler removido do vetor ", vector);
                return true;
            }
            cursor = slot.prev;
        }

        false
    }

    /// Slot da cabeça da cadeia de `vector`, se houver algum registro.
    pub fn lookup_head(&self, vector: u8) -> Option<&HandlerSlot> {
        match self.heads[vector as usize] {
            NIL => None,
            head => Some(&self.slots[vector as usize][head as usize]),
        }
    }

    /// Itera a cadeia de `vector` da cabeça para a cauda.
    pub fn iter(&self, vector: u8) -> ChainIter<'_> {
        ChainIter {
            pool: &self.slots[vector as usize],
            cursor: self.heads[vector as usize],
        }
    }

    /// Cópia dos handlers de `vector`, em ordem de registro.
    ///
    /// Os despachantes invocam a cópia depois de soltar o lock do registro,
    /// permitindo que um handler chame `attach`/`detach`.
    pub fn chain(&self, vector: u8) -> Chain {
        let mut chain = Chain::new();
        for slot in self.iter(vector) {
            if let Some(handler) = slot.handler {
                chain.push(handler);
            }
        }
        chain
    }

    /// Número de handlers registrados em `vector`.
    pub fn len(&self, vector: u8) -> usize {
        self.iter(vector).count()
    }

    pub fn is_empty(&self, vector: u8) -> bool {
        self.heads[vector as usize] == NIL
    }

    fn tail(&self, vector: u8) -> u8 {
        let pool = &self.slots[vector as usize];
        let mut cursor = self.heads[vector as usize];
        if cursor == NIL {
            return NIL;
        }
        while pool[cursor as usize].next != NIL {
            cursor = pool[cursor as usize].next;
        }
        cursor
    }
}

impl Default for InterruptRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterador sobre os slots ocupados de uma cadeia.
pub struct ChainIter<'a> {
    pool: &'a [HandlerSlot; MAX_HANDLERS],
    cursor: u8,
}

impl<'a> Iterator for ChainIter<'a> {
    type Item = &'a HandlerSlot;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor == NIL {
            return None;
        }
        let slot = &self.pool[self.cursor as usize];
        self.cursor = slot.next;
        Some(slot)
    }
}

/// Snapshot de uma cadeia de handlers (sem alocação).
#[derive(Clone, Copy)]
pub struct Chain {
    handlers: [Option<Isr>; MAX_HANDLERS],
    len: usize,
}

impl Chain {
    const fn new() -> Self {
        Self {
            handlers: [None; MAX_HANDLERS],
            len: 0,
        }
    }

    fn push(&mut self, handler: Isr) {
        self.handlers[self.len] = Some(handler);
        self.len += 1;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Isr> + '_ {
        self.handlers[..self.len].iter().flatten().copied()
    }
}
