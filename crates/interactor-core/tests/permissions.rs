use std::sync::Arc;

use alloy_primitives::{address, Address};
use alloy_sol_types::SolValue;
use defi_interactor_core::fakes::{MemoryContractReader, MemoryRoleReader};
use defi_interactor_core::{
    check_permissions, read_status, DefiInteractor, IDefiInteractor, QueryError, RoleId, RoleSet,
};

const INTERACTOR: Address = address!("d1d1d1d1d1d1d1d1d1d1d1d1d1d1d1d1d1d1d1d1");
const SAFE: Address = address!("5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a");

fn deployed(paused: bool) -> DefiInteractor {
    let reader = Arc::new(MemoryContractReader::new());
    reader.respond(INTERACTOR, &IDefiInteractor::pausedCall {}, paused.abi_encode());
    reader.respond(INTERACTOR, &IDefiInteractor::safeCall {}, SAFE.abi_encode());
    reader.respond(
        INTERACTOR,
        &IDefiInteractor::hasRoleCall {
            member: Address::repeat_byte(7),
            roleId: 1,
        },
        true.abi_encode(),
    );
    reader.respond(
        INTERACTOR,
        &IDefiInteractor::hasRoleCall {
            member: Address::repeat_byte(7),
            roleId: 2,
        },
        false.abi_encode(),
    );
    DefiInteractor::new(INTERACTOR, reader)
}

#[tokio::test]
async fn status_reports_safe_and_pause_flag() {
    let status = read_status(&deployed(true), None).await.unwrap();
    assert_eq!(status.interactor, INTERACTOR);
    assert_eq!(status.safe, SAFE);
    assert!(status.paused);
    assert_eq!(status.connected_is_safe_owner, None);
}

#[tokio::test]
async fn status_flags_connected_safe() {
    let interactor = deployed(false);

    let status = read_status(&interactor, Some(SAFE)).await.unwrap();
    assert_eq!(status.connected_is_safe_owner, Some(true));

    let status = read_status(&interactor, Some(Address::repeat_byte(1)))
        .await
        .unwrap();
    assert_eq!(status.connected_is_safe_owner, Some(false));
}

#[tokio::test]
async fn permissions_over_contract_reads() {
    let perms = check_permissions(
        &deployed(false),
        Address::repeat_byte(7),
        &RoleSet::deposit_withdraw(),
    )
    .await
    .unwrap();
    let held: Vec<RoleId> = perms.held().map(|r| r.id).collect();
    assert_eq!(held, vec![RoleId::DEFI_DEPOSIT]);
}

#[tokio::test]
async fn unanswered_role_check_fails_whole_check() {
    let err = check_permissions(
        &deployed(false),
        Address::repeat_byte(8),
        &RoleSet::deposit_withdraw(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, QueryError::RoleQueryFailed { .. }));
}

#[tokio::test]
async fn fake_reader_agrees_with_contract_reader() {
    let reader = MemoryRoleReader::new().with_members(RoleId::DEFI_DEPOSIT, [Address::repeat_byte(7)]);
    let perms = check_permissions(&reader, Address::repeat_byte(7), &RoleSet::deposit_withdraw())
        .await
        .unwrap();
    assert_eq!(perms.held().count(), 1);
}
