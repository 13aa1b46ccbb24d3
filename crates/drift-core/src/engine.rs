//! The session driver and receive pipeline that tie wire framing, the
//! strategy engine, and the store together.

use std::collections::HashSet;

use crate::address::Address;
use crate::error::{Error, Result};
use crate::hasher::Hasher;
use crate::notification::{Notification, MIN_NOTIFICATION_LENGTH};
use crate::store::Store;
use crate::strategy::Strategy;
use crate::transport::Transport;
use crate::wire::{self, Frame};

/// Outcome of one call to [`Engine::receive_notification`], surfaced for
/// logging and for tests asserting on end-to-end delivery behavior.
#[derive(Debug, PartialEq, Eq)]
pub enum ReceiveOutcome {
    /// The frame was the end-of-session sentinel; the transport was told
    /// to disconnect.
    Sentinel,
    /// The frame was dropped (too short, protocol mismatch, duplicate, or
    /// rejected by the strategy's `accept`).
    Dropped,
    /// Stored. `delivered` is true if this copy was addressed to us and
    /// therefore transitioned to terminal and landed in the inbox.
    Stored { delivered: bool },
}

/// One entry in the per-session transmit queue: a notification's
/// `hashedID` plus whether it has already gone out this session.
type QueueEntry = ([u8; 32], bool);

/// The engine: one instance per device, fixed to one strategy at
/// construction.
pub struct Engine {
    store: Store,
    hasher: Box<dyn Hasher>,
    strategy: Strategy,
    own_hashed_address: [u8; 32],
    receive_set: HashSet<[u8; 32]>,
    transmit_queue: Vec<QueueEntry>,
    rssi_threshold: i8,
}

impl Engine {
    /// Construct an engine atop an already-opened store. The receive set
    /// is populated from the store's full `hashedID` set at startup.
    pub fn new(
        store: Store,
        hasher: Box<dyn Hasher>,
        strategy: Strategy,
        own_hashed_address: [u8; 32],
    ) -> Result<Self> {
        let receive_set = store.fetch_all_hashed_ids()?;
        Ok(Self {
            store,
            hasher,
            strategy,
            own_hashed_address,
            receive_set,
            transmit_queue: Vec::new(),
            rssi_threshold: -128,
        })
    }

    // ---- Receive pipeline ----

    pub fn receive_notification(
        &mut self,
        transport: &mut impl Transport,
        bytes: &[u8],
    ) -> Result<ReceiveOutcome> {
        let frame = match wire::parse(bytes) {
            Ok(frame) => frame,
            Err(Error::FrameTooShort(len)) => {
                log::warn!("dropping frame: too short ({len} bytes)");
                return Ok(ReceiveOutcome::Dropped);
            }
            Err(Error::InvalidControlByte { protocol, destination_control, sequence_number }) => {
                log::warn!(
                    "dropping frame: invalid control byte (protocol={protocol}, destination_control={destination_control}, sequence_number={sequence_number})"
                );
                return Ok(ReceiveOutcome::Dropped);
            }
            Err(other) => return Err(other),
        };

        let notification = match frame {
            Frame::Sentinel => {
                log::debug!("received end-of-session sentinel, disconnecting");
                transport.disconnect();
                return Ok(ReceiveOutcome::Sentinel);
            }
            Frame::Data(notification) => notification,
        };

        if notification.control_byte.protocol() != self.strategy.protocol_value() {
            log::warn!(
                "dropping frame: protocol mismatch (frame={}, engine={})",
                notification.control_byte.protocol(),
                self.strategy.protocol_value()
            );
            return Ok(ReceiveOutcome::Dropped);
        }

        if self.receive_set.contains(&notification.hashed_id) {
            log::debug!("dropping duplicate hashed_id {}", hex::encode(notification.hashed_id));
            return Ok(ReceiveOutcome::Dropped);
        }

        let mut notification = notification;
        if !self.strategy.accept(&self.own_hashed_address, &notification) {
            log::debug!("strategy rejected notification, dropping");
            return Ok(ReceiveOutcome::Dropped);
        }

        if self.strategy.requests_acknowledgement_on_accept() {
            transport.acknowledge(notification.hashed_id);
        }

        self.receive_set.insert(notification.hashed_id);

        let delivered = Strategy::is_delivery(&self.own_hashed_address, &notification);
        if delivered {
            Strategy::mark_delivered(&mut notification);
            log::info!(
                "delivered notification {} to inbox",
                hex::encode(notification.hashed_id)
            );
        }

        self.store.insert_notification(&notification)?;
        transport.advertise(&Address::fresh_advertisement_tag());

        Ok(ReceiveOutcome::Stored { delivered })
    }

    /// `receiveAcknowledgement(bytes)` — exactly 32 bytes (one
    /// `hashedID`), else dropped.
    pub fn receive_acknowledgement(
        &mut self,
        transport: &mut impl Transport,
        bytes: &[u8],
    ) -> Result<bool> {
        if bytes.len() != 32 {
            log::warn!("dropping malformed acknowledgement: {} bytes", bytes.len());
            return Ok(false);
        }
        let mut hashed_id = [0u8; 32];
        hashed_id.copy_from_slice(bytes);

        let Some(mut notification) = self.store.fetch_by_hashed_id(&hashed_id)? else {
            log::debug!("dropping acknowledgement for unknown hashed_id");
            return Ok(false);
        };

        let handled = self.strategy.apply_acknowledgement(&mut notification);
        if handled {
            self.store.insert_notification(&notification)?;
            transport.advertise(&Address::fresh_advertisement_tag());
        }
        Ok(handled)
    }

    // ---- Session driver ----

    /// Drive one outgoing transmission session. Safe to re-enter: a call
    /// either fully drains the queue or leaves it partially drained for
    /// the next readiness signal.
    pub fn transmit_notifications(&mut self, transport: &mut impl Transport) -> Result<()> {
        if self.transmit_queue.is_empty() {
            let transmittable = self.store.fetch_all_transmittable()?;
            self.transmit_queue = transmittable.into_iter().map(|n| (n.hashed_id, false)).collect();
        }

        for entry in self.transmit_queue.iter_mut() {
            let (hashed_id, sent) = entry;
            if *sent {
                continue;
            }
            let Some(notification) = self.store.fetch_by_hashed_id(hashed_id)? else {
                // Vanished from the store between queueing and sending; treat as sent.
                *sent = true;
                continue;
            };

            let wire_control_byte = self.strategy.transmit_mutate(&notification);
            let frame_notification = Notification {
                control_byte: wire_control_byte,
                ..notification
            };
            let bytes = wire::encode(&frame_notification);

            if transport.send(&bytes) {
                *sent = true;
            } else {
                log::debug!("transport back-pressured, suspending transmit session");
                return Ok(());
            }
        }

        if self.transmit_queue.iter().all(|(_, sent)| *sent) {
            if transport.send(&wire::sentinel_frame()) {
                self.transmit_queue.clear();
            } else {
                log::debug!("sentinel send back-pressured, will retry next readiness signal");
            }
        }

        Ok(())
    }

    // ---- Embedder-facing API ----

    /// `send(message, to)` — construct via the active strategy's
    /// `create`, insert into the store, re-advertise.
    pub fn send(
        &mut self,
        transport: &mut impl Transport,
        message: String,
        to: [u8; 32],
        sent_timestamp: u64,
    ) -> Result<[u8; 32]> {
        let max_len = self.max_message_length(transport.max_notification_length());
        let message = if message.len() > max_len {
            // Truncation rather than rejection: the embedder is expected to
            // consult `max_message_length` before calling `send`; still,
            // never emit a frame exceeding the transport's MTU. Truncate on
            // a UTF-8 boundary so the wire body stays valid.
            log::warn!("message length {} exceeds max {max_len}, truncating", message.len());
            let mut cut = max_len;
            while cut > 0 && !message.is_char_boundary(cut) {
                cut -= 1;
            }
            message[..cut].to_string()
        } else {
            message
        };

        let notification = self.strategy.create(
            self.hasher.as_ref(),
            to,
            self.own_hashed_address,
            sent_timestamp,
            message,
        );
        let hashed_id = notification.hashed_id;
        self.store.insert_notification(&notification)?;
        self.receive_set.insert(hashed_id);

        let tag = Address::fresh_advertisement_tag();
        transport.advertise(&tag);

        Ok(hashed_id)
    }

    /// Fails with `InvalidControlByte` if `copies` is out of the
    /// `[1, 15]` range Spray-and-Wait's copy budget occupies, regardless
    /// of the active strategy; only actually updates the strategy when
    /// it's Spray-and-Wait.
    pub fn set_number_of_copies(&mut self, copies: u8) -> Result<()> {
        if copies == 0 || copies > crate::strategy::MAX_COPIES {
            return Err(Error::InvalidControlByte {
                protocol: crate::control::PROTOCOL_SPRAY_AND_WAIT,
                destination_control: crate::control::DC_FLOOD,
                sequence_number: copies,
            });
        }
        if let Strategy::SprayAndWait { .. } = self.strategy {
            self.strategy = Strategy::spray_and_wait(copies)?;
        }
        Ok(())
    }

    pub fn set_rssi_threshold(&mut self, threshold: i8) {
        self.rssi_threshold = threshold;
    }

    pub fn rssi_threshold(&self) -> i8 {
        self.rssi_threshold
    }

    pub fn own_hashed_address(&self) -> [u8; 32] {
        self.own_hashed_address
    }

    pub fn contacts(&self) -> Result<Vec<Address>> {
        self.store.contacts()
    }

    pub fn inbox(&self) -> Result<Vec<Notification>> {
        self.store.fetch_all_for(&self.own_hashed_address)
    }

    pub fn received_hashed_ids(&self) -> &HashSet<[u8; 32]> {
        &self.receive_set
    }

    pub fn max_message_length(&self, transport_mtu: usize) -> usize {
        transport_mtu.saturating_sub(MIN_NOTIFICATION_LENGTH)
    }

    pub fn store(&self) -> &Store {
        &self.store
    }
}
