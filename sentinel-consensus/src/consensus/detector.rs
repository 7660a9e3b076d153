use sentinel_common::address::Address;
use sentinel_common::env::vote_data::SignedVote;
use sentinel_common::error::Result;
use sentinel_ledger::AuthorResolver;

/// Verdict on a pair of signed votes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detection {
    /// Same author signed two different targets for one (height, view, step).
    Genuine(Address),
    NotConflicting,
    IdentityMismatch,
    DifferentHeight,
    SignatureInvalid,
}

/// Decides whether `v1` and `v2` prove a double vote.
///
/// The result does not depend on argument order, and a vote never conflicts
/// with itself. Only a failing resolver produces an `Err`.
pub fn detect<R: AuthorResolver + ?Sized>(v1: &SignedVote, v2: &SignedVote, resolver: &R) -> Result<Detection> {
    if v1.height() != v2.height() {
        return Ok(Detection::DifferentHeight);
    }
    if !v1.target.conflicts_with(&v2.target) {
        return Ok(Detection::NotConflicting);
    }

    let height = v1.height();
    let (Some(author1), Some(author2)) = (
        resolver.resolve(v1.signer_index, height)?,
        resolver.resolve(v2.signer_index, height)?,
    ) else {
        return Ok(Detection::IdentityMismatch);
    };
    if author1.address != author2.address {
        return Ok(Detection::IdentityMismatch);
    }

    if !v1.verify(&author1.public_key) || !v2.verify(&author2.public_key) {
        return Ok(Detection::SignatureInvalid);
    }

    Ok(Detection::Genuine(author1.address))
}

#[cfg(test)]
mod tests {
    use ed25519_dalek::SigningKey;
    use sentinel_common::crypto::hash::H256;
    use sentinel_common::crypto::schnorr::ValidatorPublicKey;
    use sentinel_common::env::consensus::types::{Step, VoteStep, VoteTarget};
    use sentinel_common::error::SentinelError;
    use sentinel_ledger::AuthorKey;

    use super::*;

    /// Fixed author list, same at every height.
    struct Authors(Vec<SigningKey>);

    impl AuthorResolver for Authors {
        fn resolve(&self, index: u64, _height: u64) -> Result<Option<AuthorKey>> {
            Ok(self.0.get(index as usize).map(|key| {
                let public_key = ValidatorPublicKey::from_signing_key(key);
                AuthorKey {
                    address: Address::from_public_key(&public_key),
                    public_key,
                }
            }))
        }
    }

    struct Broken;

    impl AuthorResolver for Broken {
        fn resolve(&self, _index: u64, _height: u64) -> Result<Option<AuthorKey>> {
            Err(SentinelError::Storage("disk gone".to_string()))
        }
    }

    fn authors() -> Authors {
        Authors((1..=4u8).map(|s| SigningKey::from_bytes(&[s; 32])).collect())
    }

    fn vote(authors: &Authors, index: u64, height: u64, step: Step, hash: Option<u8>) -> SignedVote {
        let target = VoteTarget::new(VoteStep::new(height, 0, step), hash.map(|b| H256([b; 32])));
        SignedVote::sign(target, index, &authors.0[index as usize])
    }

    #[test]
    fn test_genuine_double_vote_is_symmetric() {
        let authors = authors();
        let v1 = vote(&authors, 0, 10, Step::Precommit, Some(1));
        let v2 = vote(&authors, 0, 10, Step::Precommit, Some(2));

        let expected = Address::from_public_key(&ValidatorPublicKey::from_signing_key(&authors.0[0]));
        assert_eq!(detect(&v1, &v2, &authors).unwrap(), Detection::Genuine(expected));
        assert_eq!(detect(&v2, &v1, &authors).unwrap(), Detection::Genuine(expected));
    }

    #[test]
    fn test_nil_and_block_conflict() {
        let authors = authors();
        let v1 = vote(&authors, 1, 10, Step::Prevote, None);
        let v2 = vote(&authors, 1, 10, Step::Prevote, Some(2));
        assert!(matches!(detect(&v1, &v2, &authors).unwrap(), Detection::Genuine(_)));
    }

    #[test]
    fn test_vote_never_conflicts_with_itself() {
        let authors = authors();
        let v = vote(&authors, 0, 10, Step::Precommit, Some(1));
        assert_eq!(detect(&v, &v, &authors).unwrap(), Detection::NotConflicting);
        assert_eq!(detect(&v, &v.clone(), &Broken).unwrap(), Detection::NotConflicting);
    }

    #[test]
    fn test_different_height_and_step() {
        let authors = authors();
        let v1 = vote(&authors, 0, 10, Step::Precommit, Some(1));
        let v2 = vote(&authors, 0, 11, Step::Precommit, Some(2));
        let v3 = vote(&authors, 0, 10, Step::Prevote, Some(2));
        assert_eq!(detect(&v1, &v2, &authors).unwrap(), Detection::DifferentHeight);
        assert_eq!(detect(&v1, &v3, &authors).unwrap(), Detection::NotConflicting);
        assert_eq!(detect(&v2, &v1, &authors).unwrap(), Detection::DifferentHeight);
        assert_eq!(detect(&v3, &v1, &authors).unwrap(), Detection::NotConflicting);
    }

    #[test]
    fn test_different_signers_are_identity_mismatch() {
        let authors = authors();
        let v1 = vote(&authors, 0, 10, Step::Precommit, Some(1));
        let v2 = vote(&authors, 1, 10, Step::Precommit, Some(2));
        assert_eq!(detect(&v1, &v2, &authors).unwrap(), Detection::IdentityMismatch);
        assert_eq!(detect(&v2, &v1, &authors).unwrap(), Detection::IdentityMismatch);
    }

    #[test]
    fn test_out_of_range_index_is_identity_mismatch() {
        let authors = authors();
        let v1 = vote(&authors, 0, 10, Step::Precommit, Some(1));
        let mut v2 = vote(&authors, 0, 10, Step::Precommit, Some(2));
        v2.signer_index = 99;
        assert_eq!(detect(&v1, &v2, &authors).unwrap(), Detection::IdentityMismatch);
    }

    #[test]
    fn test_tampered_index_pointing_at_other_author() {
        let authors = authors();
        // Signed by author 0, claims to be author 1 on both votes.
        let mut v1 = vote(&authors, 0, 10, Step::Precommit, Some(1));
        let mut v2 = vote(&authors, 0, 10, Step::Precommit, Some(2));
        v1.signer_index = 1;
        v2.signer_index = 1;
        assert_eq!(detect(&v1, &v2, &authors).unwrap(), Detection::SignatureInvalid);
    }

    #[test]
    fn test_bad_signature() {
        let authors = authors();
        let v1 = vote(&authors, 2, 10, Step::Commit, Some(1));
        let mut v2 = vote(&authors, 2, 10, Step::Commit, Some(2));
        v2.signature = v1.signature;
        assert_eq!(detect(&v1, &v2, &authors).unwrap(), Detection::SignatureInvalid);
        assert_eq!(detect(&v2, &v1, &authors).unwrap(), Detection::SignatureInvalid);
    }

    #[test]
    fn test_every_verdict_ignores_argument_order() {
        let authors = authors();
        let base = vote(&authors, 0, 10, Step::Precommit, Some(1));
        let address = Address::from_public_key(&ValidatorPublicKey::from_signing_key(&authors.0[0]));

        let mut forged = vote(&authors, 0, 10, Step::Precommit, Some(2));
        forged.signature = base.signature;
        let mut out_of_range = vote(&authors, 0, 10, Step::Precommit, Some(2));
        out_of_range.signer_index = 99;
        let mut retagged_a = base.clone();
        let mut retagged_b = vote(&authors, 0, 10, Step::Precommit, Some(2));
        retagged_a.signer_index = 1;
        retagged_b.signer_index = 1;

        let cases = vec![
            (base.clone(), vote(&authors, 0, 10, Step::Precommit, Some(2)), Detection::Genuine(address)),
            (base.clone(), vote(&authors, 0, 10, Step::Precommit, None), Detection::Genuine(address)),
            (base.clone(), vote(&authors, 0, 11, Step::Precommit, Some(2)), Detection::DifferentHeight),
            (base.clone(), vote(&authors, 0, 10, Step::Prevote, Some(2)), Detection::NotConflicting),
            (base.clone(), base.clone(), Detection::NotConflicting),
            (base.clone(), vote(&authors, 1, 10, Step::Precommit, Some(2)), Detection::IdentityMismatch),
            (base.clone(), out_of_range, Detection::IdentityMismatch),
            (base.clone(), forged, Detection::SignatureInvalid),
            (retagged_a, retagged_b, Detection::SignatureInvalid),
        ];

        for (v1, v2, expected) in cases {
            assert_eq!(detect(&v1, &v2, &authors).unwrap(), expected);
            assert_eq!(detect(&v2, &v1, &authors).unwrap(), expected);
        }
    }

    #[test]
    fn test_resolver_failure_surfaces() {
        let authors = authors();
        let v1 = vote(&authors, 0, 10, Step::Precommit, Some(1));
        let v2 = vote(&authors, 0, 10, Step::Precommit, Some(2));
        assert!(detect(&v1, &v2, &Broken).is_err());
    }
}
