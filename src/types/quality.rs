//! Bit-mapped quality and status flags.
//!
//! Bit positions are the on-wire positions, so `bits()` of a flag set can be
//! OR-ed directly with the value bits of the carrying octet.

use bitflags::bitflags;

bitflags! {
    /// Quality descriptor (QDS) of measured values and of single/double points.
    ///
    /// Single- and double-point octets never carry `OVERFLOW`; its bit holds
    /// the point value there.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct Quality: u8 {
        /// Overflow (OV)
        const OVERFLOW = 0x01;
        /// Blocked (BL)
        const BLOCKED = 0x10;
        /// Substituted (SB)
        const SUBSTITUTED = 0x20;
        /// Not topical (NT)
        const NOT_TOPICAL = 0x40;
        /// Invalid (IV)
        const INVALID = 0x80;
    }
}

impl Quality {
    /// Flags that share an octet with a point value.
    pub const POINT_MASK: u8 = 0xF0;

    /// Check if no quality flag is set.
    #[inline]
    pub fn is_good(&self) -> bool {
        self.is_empty()
    }
}

bitflags! {
    /// Quality descriptor for protection equipment events (QDP).
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct ProtectionQuality: u8 {
        /// Elapsed time invalid (EI)
        const ELAPSED_TIME_INVALID = 0x08;
        /// Blocked (BL)
        const BLOCKED = 0x10;
        /// Substituted (SB)
        const SUBSTITUTED = 0x20;
        /// Not topical (NT)
        const NOT_TOPICAL = 0x40;
        /// Invalid (IV)
        const INVALID = 0x80;
    }
}

bitflags! {
    /// Status flags of a binary counter reading (BCR).
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct CounterFlags: u8 {
        /// Counter overflowed in the integration period (CY)
        const CARRY = 0x20;
        /// Counter was adjusted (CA)
        const ADJUSTED = 0x40;
        /// Reading is invalid (IV)
        const INVALID = 0x80;
    }
}

bitflags! {
    /// Start events of protection equipment (SPE).
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct ProtectionStartEvents: u8 {
        /// General start of operation
        const GENERAL = 0x01;
        /// Start of operation phase L1
        const PHASE_L1 = 0x02;
        /// Start of operation phase L2
        const PHASE_L2 = 0x04;
        /// Start of operation phase L3
        const PHASE_L3 = 0x08;
        /// Start of operation IE (earth current)
        const EARTH_CURRENT = 0x10;
        /// Start of operation in reverse direction
        const REVERSE_DIRECTION = 0x20;
    }
}

bitflags! {
    /// Output circuit information of protection equipment (OCI).
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct OutputCircuits: u8 {
        /// General command to output circuit
        const GENERAL = 0x01;
        /// Command to output circuit phase L1
        const PHASE_L1 = 0x02;
        /// Command to output circuit phase L2
        const PHASE_L2 = 0x04;
        /// Command to output circuit phase L3
        const PHASE_L3 = 0x08;
    }
}

bitflags! {
    /// Status of file (SOF) flags; the status code occupies bits 0..4.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct FileStatusFlags: u8 {
        /// Last file of the directory (LFD)
        const LAST_FILE = 0x20;
        /// Name defines a subdirectory (FOR)
        const DIRECTORY = 0x40;
        /// File transfer is active (FA)
        const TRANSFER_ACTIVE = 0x80;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_bits() {
        let q = Quality::from_bits_truncate(0x91);
        assert!(q.contains(Quality::OVERFLOW));
        assert!(q.contains(Quality::BLOCKED));
        assert!(q.contains(Quality::INVALID));
        assert!(!q.contains(Quality::SUBSTITUTED));
        assert_eq!(q.bits(), 0x91);
        assert!(Quality::empty().is_good());
    }

    #[test]
    fn test_reserved_bits_are_dropped() {
        // Bits 1..3 are reserved in QDS
        assert_eq!(Quality::from_bits_truncate(0x0E), Quality::empty());
        assert_eq!(CounterFlags::from_bits_truncate(0x1F), CounterFlags::empty());
    }

    #[test]
    fn test_protection_quality_elapsed_time() {
        let q = ProtectionQuality::from_bits_truncate(0x88);
        assert_eq!(
            q,
            ProtectionQuality::ELAPSED_TIME_INVALID | ProtectionQuality::INVALID
        );
    }
}
