use anchor_lang::prelude::*;

use crate::{config::PUBKEY_SIZE, errors::QuartzError};

const EVM_ADDRESS_SIZE: usize = 20;

/// CCTP addresses an EVM account as its 20 bytes left padded to 32.
pub fn evm_address_to_solana(evm_address: &str) -> Result<Pubkey> {
    let hex = evm_address
        .strip_prefix("0x")
        .ok_or(QuartzError::InvalidEvmAddress)?;
    require!(
        hex.len() == EVM_ADDRESS_SIZE * 2 && hex.bytes().all(|b| b.is_ascii_hexdigit()),
        QuartzError::InvalidEvmAddress
    );

    let mut bytes = [0u8; PUBKEY_SIZE];
    let padding = PUBKEY_SIZE - EVM_ADDRESS_SIZE;
    for (i, byte) in bytes[padding..].iter_mut().enumerate() {
        let pair = hex
            .get(i * 2..i * 2 + 2)
            .ok_or(QuartzError::InvalidEvmAddress)?;
        *byte = u8::from_str_radix(pair, 16).map_err(|_| QuartzError::InvalidEvmAddress)?;
    }

    Ok(Pubkey::new_from_array(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PROVIDER_BASE_ADDRESS, QUARTZ_CALLER_BASE_ADDRESS};

    #[test]
    fn evm_address_is_left_padded() {
        let key = evm_address_to_solana(PROVIDER_BASE_ADDRESS).unwrap();
        let bytes = key.to_bytes();
        assert_eq!(bytes[..12], [0u8; 12]);
        assert_eq!(bytes[12], 0x2f);
        assert_eq!(bytes[13], 0x08);
        assert_eq!(bytes[31], 0x3d);
        assert!(evm_address_to_solana(QUARTZ_CALLER_BASE_ADDRESS).is_ok());
    }

    #[test]
    fn malformed_evm_addresses_are_rejected() {
        let expected: Error = QuartzError::InvalidEvmAddress.into();
        for bad in [
            "2f08d2B5E1CBC587cfdf7DA1679F2fe200fe493d",
            "0x2f08d2B5E1CBC587cfdf7DA1679F2fe200fe493",
            "0x2f08d2B5E1CBC587cfdf7DA1679F2fe200fe493dff",
            "0xzz08d2B5E1CBC587cfdf7DA1679F2fe200fe493d",
            "0x2f08d2B5E1CBC587cfdf7DA1679F2fe200fe49é",
        ] {
            assert_eq!(evm_address_to_solana(bad).unwrap_err(), expected);
        }
    }
}
