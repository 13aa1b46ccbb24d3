use std::time::{SystemTime, UNIX_EPOCH};

use drift_core::Transport;
use driftd::{LoopbackTransport, Result};

use crate::bootstrap::BootstrapContext;

/// A transport with no peer: used for `send`/`identity`-style commands
/// that only need to exercise the embedder-facing API, not drive an
/// actual session. Always accepts sends; there is nowhere for the bytes
/// to go but the void.
struct NullTransport {
    mtu: usize,
}

impl Transport for NullTransport {
    fn max_notification_length(&self) -> usize {
        self.mtu
    }

    fn send(&mut self, _bytes: &[u8]) -> bool {
        true
    }

    fn acknowledge(&mut self, _hashed_id: [u8; 32]) {}

    fn disconnect(&mut self) {}

    fn advertise(&mut self, tag: &str) {
        log::debug!("advertising under tag {tag}");
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

pub(crate) fn identity(context: &BootstrapContext) -> Result<()> {
    println!("{}", hex::encode(context.own_address.hashed));
    Ok(())
}

pub(crate) fn send(mut context: BootstrapContext, to: &str, message: String) -> Result<()> {
    let to_bytes = hex::decode(to).map_err(|_| {
        driftd::Error::UnknownContact(format!("'{to}' is not valid hex"))
    })?;
    let to: [u8; 32] = to_bytes
        .try_into()
        .map_err(|_| driftd::Error::UnknownContact(format!("'{to}' is not 32 bytes")))?;

    let mut transport = NullTransport { mtu: 512 };
    let hashed_id = context.engine.send(&mut transport, message, to, now_secs())?;
    println!("{}", hex::encode(hashed_id));
    Ok(())
}

pub(crate) fn inbox(context: &BootstrapContext) -> Result<()> {
    for notification in context.engine.inbox()? {
        println!(
            "{} from={} {}",
            hex::encode(notification.hashed_id),
            hex::encode(notification.hashed_source_address),
            notification.message
        );
    }
    Ok(())
}

pub(crate) fn contacts(context: &BootstrapContext) -> Result<()> {
    for contact in context.engine.contacts()? {
        let label = contact.name.as_deref().unwrap_or("-");
        println!("{} {}", hex::encode(contact.hashed), label);
    }
    Ok(())
}

/// Runs two in-process engines (this node plus an ephemeral peer) over a
/// `LoopbackTransport` pair, sends one message, and drains both sides
/// until settled. Useful for exercising a strategy without any real link.
pub(crate) fn demo(mut context: BootstrapContext, message: String) -> Result<()> {
    use drift_core::{Engine, Store};

    let peer_store = Store::in_memory()?;
    let peer_address = drift_core::Address::generate(&driftd::Sha256Hasher, true);
    let mut peer_engine = Engine::new(
        peer_store,
        Box::new(driftd::Sha256Hasher),
        drift_core::Strategy::Epidemic,
        peer_address.hashed,
    )?;

    let (mut local_link, mut peer_link) = LoopbackTransport::pair(512);

    let hashed_id = context
        .engine
        .send(&mut local_link, message, peer_address.hashed, now_secs())?;
    println!("sent {} to peer {}", hex::encode(hashed_id), hex::encode(peer_address.hashed));

    context.engine.transmit_notifications(&mut local_link)?;

    // The frames this node just produced sit in the peer's inbound queue.
    for frame in peer_link.drain_incoming() {
        let outcome = peer_engine.receive_notification(&mut peer_link, &frame)?;
        log::info!("peer received frame: {outcome:?}");
    }

    for notification in peer_engine.inbox()? {
        println!("peer inbox: {}", notification.message);
    }

    Ok(())
}
