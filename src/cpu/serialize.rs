use serde::{Deserialize, Serialize};

use crate::controller::Controller;

#[derive(Clone, Serialize, Deserialize)]
pub struct CpuData {
    mem: Vec<u8>,
    a: u8,
    x: u8,
    y: u8,
    pc: usize,
    s: u8,
    p: u8,
    clock: u64,
    delay: usize,
    pending_irq: bool,
    controllers: [Controller; 2],
}

impl super::Cpu {
    pub fn save_state(&self) -> CpuData {
        CpuData {
            mem: self.mem.clone(),
            a: self.a,
            x: self.x,
            y: self.y,
            pc: self.pc,
            s: self.s,
            p: self.p,
            clock: self.clock,
            delay: self.delay,
            pending_irq: self.pending_irq,
            controllers: self.controllers.clone(),
        }
    }

    pub fn load_state(&mut self, data: CpuData) {
        self.mem = data.mem;
        self.a = data.a;
        self.x = data.x;
        self.y = data.y;
        self.pc = data.pc;
        self.s = data.s;
        self.p = data.p;
        self.clock = data.clock;
        self.delay = data.delay;
        self.pending_irq = data.pending_irq;
        self.controllers = data.controllers;
    }
}
