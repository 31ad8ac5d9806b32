use alloy_primitives::Address;
use defi_interactor_core::{reconcile, reconcile_roles, ManagedAccount, RoleId, RoleMembers};

fn addr(byte: u8) -> Address {
    Address::repeat_byte(byte)
}

fn deposit(members: &[Address]) -> RoleMembers {
    RoleMembers::new(RoleId::DEFI_DEPOSIT, members.iter().copied())
}

fn withdraw(members: &[Address]) -> RoleMembers {
    RoleMembers::new(RoleId::DEFI_WITHDRAW, members.iter().copied())
}

fn find(accounts: &[ManagedAccount], address: Address) -> &ManagedAccount {
    accounts
        .iter()
        .find(|a| a.address == address)
        .unwrap_or_else(|| panic!("{address} missing"))
}

// ── Union and flags ─────────────────────────────────────────────────────

#[test]
fn disjoint_lists_yield_one_entry_per_address() {
    let a = [addr(1), addr(2), addr(3)];
    let b = [addr(4), addr(5)];
    let accounts = reconcile(deposit(&a), withdraw(&b));

    assert_eq!(accounts.len(), a.len() + b.len());
    for address in a.iter().chain(b.iter()) {
        let matches = accounts.iter().filter(|acc| acc.address == *address).count();
        assert_eq!(matches, 1, "{address} should appear exactly once");
    }
}

#[test]
fn one_sided_addresses_carry_one_flag() {
    let accounts = reconcile(deposit(&[addr(1)]), withdraw(&[addr(2)]));

    let a_only = find(&accounts, addr(1));
    assert!(a_only.has_role(RoleId::DEFI_DEPOSIT));
    assert!(!a_only.has_role(RoleId::DEFI_WITHDRAW));

    let b_only = find(&accounts, addr(2));
    assert!(!b_only.has_role(RoleId::DEFI_DEPOSIT));
    assert!(b_only.has_role(RoleId::DEFI_WITHDRAW));
}

#[test]
fn overlapping_example_has_three_entries() {
    let accounts = reconcile(
        deposit(&[addr(1), addr(2)]),
        withdraw(&[addr(2), addr(3)]),
    );
    assert_eq!(accounts.len(), 3);

    let both = find(&accounts, addr(2));
    assert!(both.has_role(RoleId::DEFI_DEPOSIT));
    assert!(both.has_role(RoleId::DEFI_WITHDRAW));
    assert!(!find(&accounts, addr(1)).has_role(RoleId::DEFI_WITHDRAW));
    assert!(!find(&accounts, addr(3)).has_role(RoleId::DEFI_DEPOSIT));
}

#[test]
fn empty_inputs_yield_nothing() {
    assert!(reconcile(deposit(&[]), withdraw(&[])).is_empty());
    assert!(reconcile_roles(&[]).is_empty());
}

// ── Address canonicalization ────────────────────────────────────────────

#[test]
fn hex_case_does_not_split_entries() {
    let upper: Address = "0xABCDEF0123456789ABCDEF0123456789ABCDEF01".parse().unwrap();
    let lower: Address = "0xabcdef0123456789abcdef0123456789abcdef01".parse().unwrap();

    let accounts = reconcile(deposit(&[upper]), withdraw(&[lower]));
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].held_roles().len(), 2);
}

// ── Parameterized roles ─────────────────────────────────────────────────

#[test]
fn every_account_reports_every_queried_role() {
    let roles = [
        RoleMembers::new(RoleId(1), [addr(1)]),
        RoleMembers::new(RoleId(2), [addr(2)]),
        RoleMembers::new(RoleId(7), [addr(1), addr(3)]),
    ];
    let accounts = reconcile_roles(&roles);
    assert_eq!(accounts.len(), 3);
    for account in &accounts {
        assert_eq!(account.roles.len(), 3);
    }
    let first = find(&accounts, addr(1));
    assert_eq!(first.held_roles(), vec![RoleId(1), RoleId(7)]);
}
