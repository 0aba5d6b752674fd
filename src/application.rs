use parking_lot::Mutex;

use crate::protocol::DataPacket;

/// Upper layer receiving data packets addressed to the local node.
pub trait Application: Send + Sync {
    fn deliver_up(&self, packet: DataPacket);
}

/// Application that keeps every delivered packet.
#[derive(Debug, Default)]
pub struct Inbox {
    delivered: Mutex<Vec<DataPacket>>,
}

impl Inbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delivered(&self) -> Vec<DataPacket> {
        self.delivered.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.delivered.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.delivered.lock().is_empty()
    }

    /// Mean number of forwarding steps over all delivered packets.
    pub fn average_hops(&self) -> Option<f64> {
        let delivered = self.delivered.lock();
        if delivered.is_empty() {
            return None;
        }
        let total: u64 = delivered.iter().map(|p| u64::from(p.sequence_number)).sum();
        Some(total as f64 / delivered.len() as f64)
    }
}

impl Application for Inbox {
    fn deliver_up(&self, packet: DataPacket) {
        self.delivered.lock().push(packet);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_hops_uses_sequence_numbers() {
        let inbox = Inbox::new();
        assert_eq!(inbox.average_hops(), None);

        let mut one = DataPacket::new(1, 9, "a");
        one.sequence_number = 1;
        let mut three = DataPacket::new(2, 9, "b");
        three.sequence_number = 3;

        inbox.deliver_up(one);
        inbox.deliver_up(three);
        assert_eq!(inbox.len(), 2);
        assert_eq!(inbox.average_hops(), Some(2.0));
    }
}
