//! MultiSend batching.
//!
//! A batch is packed as `operation (1) | to (20) | value (32) | len (32) | data`
//! per call and handed to `multiSend(bytes)`, which the Safe reaches through a
//! delegate call.

use alloy_primitives::{address, Address, Bytes, FixedBytes, U256};
use alloy_sol_types::{sol, SolValue};

use crate::proposal::encode::encode_call;
use crate::proposal::safe_tx::Operation;
use crate::proposal::TransactionRequest;

sol! {
    interface IMultiSend {
        function multiSend(bytes memory transactions) external payable;
    }
}

/// Canonical MultiSendCallOnly v1.3.0 deployment.
pub const MULTISEND_CALL_ONLY: Address = address!("40A2aCCbd92BCA938b02010E17A5b8929b49130D");

/// Packed encoding of `transactions`, all as plain calls.
pub fn pack_transactions(transactions: &[TransactionRequest]) -> Vec<u8> {
    transactions
        .iter()
        .flat_map(|tx| {
            (
                FixedBytes::<1>::from([Operation::Call as u8]),
                tx.to,
                tx.value,
                U256::from(tx.data.len()),
                tx.data.clone(),
            )
                .abi_encode_packed()
        })
        .collect()
}

/// Calldata for `multiSend(pack_transactions(transactions))`.
pub fn encode_multisend(transactions: &[TransactionRequest]) -> Bytes {
    encode_call(&IMultiSend::multiSendCall {
        transactions: Bytes::from(pack_transactions(transactions)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_sol_types::SolCall;

    #[test]
    fn test_packed_layout_of_one_call() {
        let tx = TransactionRequest {
            to: Address::repeat_byte(0xab),
            value: U256::from(5),
            data: Bytes::from(vec![0xde, 0xad]),
        };
        let packed = pack_transactions(&[tx]);

        assert_eq!(packed.len(), 1 + 20 + 32 + 32 + 2);
        assert_eq!(packed[0], 0);
        assert_eq!(&packed[1..21], Address::repeat_byte(0xab).as_slice());
        assert_eq!(packed[52], 5);
        assert_eq!(packed[84], 2);
        assert_eq!(&packed[85..], &[0xde, 0xad]);
    }

    #[test]
    fn test_empty_calldata_packs_zero_length() {
        let tx = TransactionRequest {
            to: Address::repeat_byte(0x01),
            value: U256::ZERO,
            data: Bytes::new(),
        };
        let packed = pack_transactions(&[tx]);
        assert_eq!(packed.len(), 85);
        assert!(packed[53..85].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_entries_are_concatenated_in_order() {
        let a = TransactionRequest::call(Address::repeat_byte(1), vec![0x01]);
        let b = TransactionRequest::call(Address::repeat_byte(2), vec![]);
        let packed = pack_transactions(&[a, b]);
        assert_eq!(packed.len(), 86 + 85);
        assert_eq!(&packed[87..107], Address::repeat_byte(2).as_slice());
    }

    #[test]
    fn test_multisend_calldata_round_trips_payload() {
        let txs = [TransactionRequest::call(Address::repeat_byte(3), vec![0xaa; 4])];
        let data = encode_multisend(&txs);
        assert_eq!(&data[..4], IMultiSend::multiSendCall::SELECTOR.as_slice());

        let decoded = IMultiSend::multiSendCall::abi_decode(&data).unwrap();
        assert_eq!(decoded.transactions.as_ref(), pack_transactions(&txs).as_slice());
    }
}
