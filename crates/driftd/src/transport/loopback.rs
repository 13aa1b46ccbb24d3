use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use drift_core::Transport;

/// An in-process `Transport` for exercising the engine without a radio.
/// [`pair`] wires two instances back to back; frames sent on one side sit
/// in the other side's inbound queue until drained. No back-pressure is
/// modeled — `send` always succeeds, since there is no real link MTU to
/// stall against.
pub struct LoopbackTransport {
    mtu: usize,
    outbound: Rc<RefCell<VecDeque<Vec<u8>>>>,
    inbound: Rc<RefCell<VecDeque<Vec<u8>>>>,
    ack_outbound: Rc<RefCell<VecDeque<[u8; 32]>>>,
    ack_inbound: Rc<RefCell<VecDeque<[u8; 32]>>>,
    disconnected: Rc<Cell<bool>>,
    advertised: Rc<RefCell<Vec<String>>>,
}

impl LoopbackTransport {
    /// Build two ends of the same link, each other's peer.
    pub fn pair(mtu: usize) -> (Self, Self) {
        let a_to_b = Rc::new(RefCell::new(VecDeque::new()));
        let b_to_a = Rc::new(RefCell::new(VecDeque::new()));
        let acks_a_to_b = Rc::new(RefCell::new(VecDeque::new()));
        let acks_b_to_a = Rc::new(RefCell::new(VecDeque::new()));

        let a = Self {
            mtu,
            outbound: a_to_b.clone(),
            inbound: b_to_a.clone(),
            ack_outbound: acks_a_to_b.clone(),
            ack_inbound: acks_b_to_a.clone(),
            disconnected: Rc::new(Cell::new(false)),
            advertised: Rc::new(RefCell::new(Vec::new())),
        };
        let b = Self {
            mtu,
            outbound: b_to_a,
            inbound: a_to_b,
            ack_outbound: acks_b_to_a,
            ack_inbound: acks_a_to_b,
            disconnected: Rc::new(Cell::new(false)),
            advertised: Rc::new(RefCell::new(Vec::new())),
        };
        (a, b)
    }

    /// Pull every frame the peer has sent since the last drain.
    pub fn drain_incoming(&mut self) -> Vec<Vec<u8>> {
        self.inbound.borrow_mut().drain(..).collect()
    }

    /// Pull every acknowledgement the peer has sent since the last drain.
    pub fn drain_incoming_acknowledgements(&mut self) -> Vec<[u8; 32]> {
        self.ack_inbound.borrow_mut().drain(..).collect()
    }

    pub fn is_disconnected(&self) -> bool {
        self.disconnected.get()
    }

    pub fn advertised_tags(&self) -> Vec<String> {
        self.advertised.borrow().clone()
    }
}

impl Transport for LoopbackTransport {
    fn max_notification_length(&self) -> usize {
        self.mtu
    }

    fn send(&mut self, bytes: &[u8]) -> bool {
        self.outbound.borrow_mut().push_back(bytes.to_vec());
        true
    }

    fn acknowledge(&mut self, hashed_id: [u8; 32]) {
        self.ack_outbound.borrow_mut().push_back(hashed_id);
    }

    fn disconnect(&mut self) {
        self.disconnected.set(true);
    }

    fn advertise(&mut self, tag: &str) {
        self.advertised.borrow_mut().push(tag.to_string());
    }
}
