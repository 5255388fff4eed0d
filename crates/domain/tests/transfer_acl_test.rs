use split_dns_domain::TransferAcl;
use std::net::IpAddr;

fn ip(s: &str) -> IpAddr {
    s.parse().unwrap()
}

#[test]
fn test_allows_listed_client() {
    let acl = TransferAcl::new(["1.2.3.4", "::1"]);
    assert!(acl.allows(ip("1.2.3.4")));
    assert!(acl.allows(ip("::1")));
}

#[test]
fn test_rejects_unlisted_client() {
    let acl = TransferAcl::new(["1.2.3.4"]);
    assert!(!acl.allows(ip("1.2.3.5")));
}

#[test]
fn test_empty_acl_rejects_everyone() {
    let acl = TransferAcl::default();
    assert!(acl.is_empty());
    assert!(!acl.allows(ip("127.0.0.1")));
}

#[test]
fn test_no_subnet_matching() {
    let acl = TransferAcl::new(["10.0.0.0"]);
    assert!(!acl.allows(ip("10.0.0.1")));
}

#[test]
fn test_entries_are_trimmed() {
    let acl = TransferAcl::new([" 1.2.3.4 ", ""]);
    assert_eq!(acl.len(), 1);
    assert!(acl.allows(ip("1.2.3.4")));
}
