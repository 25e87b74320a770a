//! # NTAG Chip Layout and Write Protection
//!
//! Labels live on NTAG213/215/216 tags. The chip type is read from byte 2 of
//! the capability container (page 3), which gives the pages holding the
//! configuration, the password and the PACK.
//!
//! ```text
//! config page + 0: MIRROR | RFUI | MIRROR_PAGE | AUTH0
//! config page + 1: ACCESS | VCTID | RFUI | RFUI
//! ```
//!
//! `AUTH0` is the first page guarded by the password; `0xFF` leaves the tag
//! unprotected. Protection starts at the label (page 4).

use tracing::debug;

use crate::error::LabelError;
use crate::seed::TagPassword;

/// First page of the label TLV.
pub const LABEL_START_PAGE: u8 = 4;
/// Bytes zeroed from [`LABEL_START_PAGE`] when a label is erased.
pub const LABEL_AREA_LEN: usize = 144;
/// Configuration bytes read and written as one block (two pages).
pub const CONFIG_LEN: usize = 8;

const AUTH0: usize = 3;
const ACCESS: usize = 4;
const AUTH0_DISABLED: u8 = 0xFF;

/// PWD_AUTH command code.
const CMD_PWD_AUTH: u8 = 0x1B;
/// Offset of the status byte in a reader's PWD_AUTH response.
const RESPONSE_STATUS: usize = 2;
const RESPONSE_PACK: usize = 3;

/// Supported NTAG21x chips.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NtagChip {
    Ntag213,
    Ntag215,
    Ntag216,
}

impl NtagChip {
    /// Identifies the chip from capability container byte 2 (data area size).
    pub fn from_capability(size_byte: u8) -> Result<Self, LabelError> {
        match size_byte {
            0x12 => Ok(Self::Ntag213),
            0x3E => Ok(Self::Ntag215),
            0x6D => Ok(Self::Ntag216),
            other => Err(LabelError::UnknownChip(other)),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Ntag213 => "NTAG213",
            Self::Ntag215 => "NTAG215",
            Self::Ntag216 => "NTAG216",
        }
    }

    /// Page holding `AUTH0`; the next page holds `ACCESS`.
    pub fn config_page(self) -> u8 {
        match self {
            Self::Ntag213 => 0x29,
            Self::Ntag215 => 0x83,
            Self::Ntag216 => 0xE3,
        }
    }

    pub fn password_page(self) -> u8 {
        self.config_page() + 2
    }

    pub fn pack_page(self) -> u8 {
        self.config_page() + 3
    }
}

/// The two configuration pages of an NTAG21x.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TagConfig([u8; CONFIG_LEN]);

impl TagConfig {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LabelError> {
        let bytes: [u8; CONFIG_LEN] = bytes.try_into().map_err(|_| LabelError::Truncated {
            needed: CONFIG_LEN,
            available: bytes.len(),
        })?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; CONFIG_LEN] {
        &self.0
    }

    pub fn auth0(&self) -> u8 {
        self.0[AUTH0]
    }

    pub fn access(&self) -> u8 {
        self.0[ACCESS]
    }

    pub fn is_protected(&self) -> bool {
        self.auth0() != AUTH0_DISABLED
    }

    /// Password-protects writes from the label page on.
    ///
    /// Clears `ACCESS`, so reads stay open and the configuration stays
    /// writable.
    pub fn protect(&mut self) -> Result<(), LabelError> {
        if self.is_protected() {
            return Err(LabelError::AlreadyProtected {
                auth0: self.auth0(),
            });
        }
        self.0[AUTH0] = LABEL_START_PAGE;
        self.0[ACCESS] = 0;
        Ok(())
    }

    /// Removes password protection. Must be written after a successful
    /// PWD_AUTH.
    pub fn unprotect(&mut self) {
        self.0[AUTH0] = AUTH0_DISABLED;
        self.0[ACCESS] = 0;
    }
}

impl TagPassword {
    /// Password page contents.
    pub fn password_page(&self) -> [u8; 4] {
        self.password
    }

    /// PACK page contents: the PACK followed by two zero bytes.
    pub fn pack_page(&self) -> [u8; 4] {
        [self.pack[0], self.pack[1], 0, 0]
    }

    /// PWD_AUTH frame for the tag: command code then the 4-byte password.
    pub fn pwd_auth_command(&self) -> [u8; 5] {
        let [a, b, c, d] = self.password;
        [CMD_PWD_AUTH, a, b, c, d]
    }

    /// Compares the PACK a tag answered with against the derived one.
    pub fn check_pack(&self, received: &[u8]) -> Result<(), LabelError> {
        if received != self.pack.as_slice() {
            debug!(
                expected = %hex::encode(self.pack),
                received = %hex::encode(received),
                "PACK mismatch"
            );
            return Err(LabelError::PackMismatch {
                expected: self.pack,
                received: received.to_vec(),
            });
        }
        Ok(())
    }

    /// Checks a reader's PWD_AUTH response: status byte at offset 2, PACK
    /// at offsets 3..5, seven bytes in total.
    pub fn check_auth_response(&self, response: &[u8]) -> Result<(), LabelError> {
        if response.len() < RESPONSE_PACK + 2 {
            return Err(LabelError::Truncated {
                needed: RESPONSE_PACK + 2,
                available: response.len(),
            });
        }
        if response[RESPONSE_STATUS] != 0x00 || response.len() < 7 {
            return Err(LabelError::AuthenticationFailed);
        }
        self.check_pack(&response[RESPONSE_PACK..RESPONSE_PACK + 2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UID: [u8; 7] = [0x04, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66];

    /// Factory configuration: AUTH0 0xFF, VCTID 0x05.
    fn factory_config() -> TagConfig {
        TagConfig::from_bytes(&[0x04, 0x00, 0x00, 0xFF, 0x00, 0x05, 0x00, 0x00]).unwrap()
    }

    // =========================================================================
    // CHIP DETECTION
    // =========================================================================

    #[test]
    fn test_chip_offsets() {
        let chip = NtagChip::from_capability(0x12).unwrap();
        assert_eq!(chip, NtagChip::Ntag213);
        assert_eq!(
            (chip.config_page(), chip.password_page(), chip.pack_page()),
            (0x29, 0x2B, 0x2C)
        );

        let chip = NtagChip::from_capability(0x3E).unwrap();
        assert_eq!(chip.name(), "NTAG215");
        assert_eq!(
            (chip.config_page(), chip.password_page(), chip.pack_page()),
            (0x83, 0x85, 0x86)
        );

        let chip = NtagChip::from_capability(0x6D).unwrap();
        assert_eq!(chip, NtagChip::Ntag216);
        assert_eq!(
            (chip.config_page(), chip.password_page(), chip.pack_page()),
            (0xE3, 0xE5, 0xE6)
        );
    }

    #[test]
    fn test_unknown_chip() {
        assert_eq!(
            NtagChip::from_capability(0x6E).unwrap_err(),
            LabelError::UnknownChip(0x6E)
        );
        assert!(NtagChip::from_capability(0x00).is_err());
    }

    // =========================================================================
    // CONFIGURATION
    // =========================================================================

    #[test]
    fn test_protect_rewrites_auth0_and_access() {
        let mut config = factory_config();
        assert!(!config.is_protected());

        config.protect().unwrap();
        assert!(config.is_protected());
        assert_eq!(config.auth0(), 0x04);
        assert_eq!(config.access(), 0x00);
        // Other configuration bytes are left alone.
        assert_eq!(config.as_bytes()[5], 0x05);
    }

    #[test]
    fn test_protect_refuses_protected_tag() {
        let mut config = factory_config();
        config.protect().unwrap();
        assert_eq!(
            config.protect().unwrap_err(),
            LabelError::AlreadyProtected { auth0: 0x04 }
        );

        let mut foreign =
            TagConfig::from_bytes(&[0x04, 0x00, 0x00, 0x10, 0x80, 0x05, 0x00, 0x00]).unwrap();
        assert!(matches!(
            foreign.protect(),
            Err(LabelError::AlreadyProtected { auth0: 0x10 })
        ));
    }

    #[test]
    fn test_unprotect() {
        let mut config = factory_config();
        config.protect().unwrap();
        config.unprotect();
        assert!(!config.is_protected());
        assert_eq!(config, factory_config());
    }

    #[test]
    fn test_config_length() {
        assert_eq!(
            TagConfig::from_bytes(&[0xFF; 4]).unwrap_err(),
            LabelError::Truncated {
                needed: 8,
                available: 4
            }
        );
    }

    // =========================================================================
    // PASSWORD AUTHENTICATION
    // =========================================================================

    #[test]
    fn test_password_frames() {
        let pw = TagPassword::derive(b"secret", &UID);
        assert_eq!(pw.password_page(), pw.password);
        assert_eq!(&pw.pack_page()[..2], &pw.pack);
        assert_eq!(&pw.pack_page()[2..], &[0, 0]);

        let cmd = pw.pwd_auth_command();
        assert_eq!(cmd[0], 0x1B);
        assert_eq!(&cmd[1..], &pw.password);
    }

    #[test]
    fn test_check_pack() {
        let pw = TagPassword::derive(b"secret", &UID);
        assert_eq!(pw.check_pack(&pw.pack), Ok(()));

        let wrong = [pw.pack[0] ^ 0xFF, pw.pack[1]];
        assert_eq!(
            pw.check_pack(&wrong).unwrap_err(),
            LabelError::PackMismatch {
                expected: pw.pack,
                received: wrong.to_vec()
            }
        );
        // A PACK derived from another passphrase does not match.
        let other = TagPassword::derive(b"other", &UID);
        assert!(pw.check_pack(&other.pack).is_err());
        assert!(pw.check_pack(&pw.pack[..1]).is_err());
    }

    #[test]
    fn test_check_auth_response() {
        let pw = TagPassword::derive(b"secret", &UID);
        let ok = [0xD5, 0x43, 0x00, pw.pack[0], pw.pack[1], 0x90, 0x00];
        assert_eq!(pw.check_auth_response(&ok), Ok(()));

        assert!(matches!(
            pw.check_auth_response(&ok[..4]),
            Err(LabelError::Truncated { .. })
        ));

        let mut failed = ok;
        failed[2] = 0x01;
        assert_eq!(
            pw.check_auth_response(&failed).unwrap_err(),
            LabelError::AuthenticationFailed
        );
        assert_eq!(
            pw.check_auth_response(&ok[..6]).unwrap_err(),
            LabelError::AuthenticationFailed
        );

        let mut wrong_pack = ok;
        wrong_pack[4] ^= 0x01;
        assert!(matches!(
            pw.check_auth_response(&wrong_pack),
            Err(LabelError::PackMismatch { .. })
        ));
    }
}
