//! Greedy denomination selection.
//!
//! Proofs are considered in descending amount order (stable, so equal
//! amounts keep inventory order) and accumulated until the running total
//! reaches the target. The result may overshoot; change is the caller's
//! concern.

use cashu_types::{Amount, Proof};

use crate::{Result, WalletError};

/// Pick indices into `amounts` covering `target`.
pub(crate) fn select_indices(amounts: &[Amount], target: Amount) -> Result<Vec<usize>> {
    if target == 0 {
        return Ok(Vec::new());
    }

    let mut order: Vec<usize> = (0..amounts.len()).collect();
    order.sort_by(|a, b| amounts[*b].cmp(&amounts[*a]));

    let mut selected = Vec::new();
    let mut sum: u128 = 0;
    for index in order {
        selected.push(index);
        sum += u128::from(amounts[index]);
        if sum >= u128::from(target) {
            return Ok(selected);
        }
    }

    // sum < target <= u64::MAX here
    Err(WalletError::InsufficientBalance {
        required: target,
        available: u64::try_from(sum).map_err(|_| WalletError::AmountOverflow)?,
    })
}

/// Select proofs whose amounts sum to at least `target`.
///
/// A zero target selects nothing. If the whole inventory is short, nothing
/// is selected and the error carries the shortfall.
///
/// # Errors
///
/// [`WalletError::InsufficientBalance`] if `sum(inventory) < target`.
pub fn select_proofs(inventory: &[Proof], target: Amount) -> Result<Vec<Proof>> {
    let amounts: Vec<Amount> = inventory.iter().map(|p| p.amount).collect();
    let selected = select_indices(&amounts, target)?;
    tracing::debug!(target, count = selected.len(), "proofs selected");
    Ok(selected.into_iter().map(|i| inventory[i].clone()).collect())
}

/// Decompose an amount into its power-of-two parts, ascending.
pub fn split_amount(amount: Amount) -> Vec<Amount> {
    (0..Amount::BITS)
        .map(|bit| 1u64 << bit)
        .filter(|part| amount & part != 0)
        .collect()
}

/// Checked sum of proof amounts.
pub fn total(proofs: &[Proof]) -> Result<Amount> {
    proofs
        .iter()
        .try_fold(0u64, |acc, p| acc.checked_add(p.amount))
        .ok_or(WalletError::AmountOverflow)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use cashu_crypto::PublicKey;
    use cashu_types::{KeysetId, Secret};

    use super::*;

    fn proof(amount: Amount, tag: &str) -> Proof {
        Proof {
            amount,
            id: KeysetId::from_keys(&BTreeMap::from([(1, PublicKey::GENERATOR)])),
            secret: Secret::new(tag),
            c: PublicKey::GENERATOR,
        }
    }

    fn amounts(proofs: &[Proof]) -> Vec<Amount> {
        proofs.iter().map(|p| p.amount).collect()
    }

    #[test]
    fn test_largest_first() {
        let inventory = vec![proof(10, "a"), proof(50, "b"), proof(5, "c"), proof(20, "d")];
        let selected = select_proofs(&inventory, 30).expect("select");
        assert_eq!(amounts(&selected), vec![50]);
    }

    #[test]
    fn test_accumulates_until_covered() {
        let inventory = vec![proof(8, "a"), proof(4, "b"), proof(2, "c"), proof(1, "d")];
        let selected = select_proofs(&inventory, 13).expect("select");
        assert_eq!(amounts(&selected), vec![8, 4, 2]);
        assert!(total(&selected).expect("total") >= 13);
    }

    #[test]
    fn test_exact_match() {
        let inventory = vec![proof(4, "a"), proof(1, "b"), proof(2, "c")];
        let selected = select_proofs(&inventory, 7).expect("select");
        assert_eq!(amounts(&selected), vec![4, 2, 1]);
    }

    #[test]
    fn test_insufficient_balance() {
        let inventory = vec![proof(10, "a"), proof(5, "b")];
        assert!(matches!(
            select_proofs(&inventory, 30),
            Err(WalletError::InsufficientBalance {
                required: 30,
                available: 15
            })
        ));
    }

    #[test]
    fn test_zero_target_selects_nothing() {
        let inventory = vec![proof(1, "a")];
        assert!(select_proofs(&inventory, 0).expect("select").is_empty());
        assert!(select_proofs(&[], 0).expect("empty").is_empty());
    }

    #[test]
    fn test_empty_inventory() {
        assert!(matches!(
            select_proofs(&[], 1),
            Err(WalletError::InsufficientBalance { required: 1, available: 0 })
        ));
    }

    #[test]
    fn test_ties_keep_inventory_order() {
        let inventory = vec![proof(4, "first"), proof(4, "second"), proof(4, "third")];
        let selected = select_proofs(&inventory, 8).expect("select");
        let secrets: Vec<&str> = selected.iter().map(|p| p.secret.as_str()).collect();
        assert_eq!(secrets, vec!["first", "second"]);
    }

    #[test]
    fn test_large_amounts_do_not_overflow() {
        let inventory = vec![proof(u64::MAX, "a"), proof(u64::MAX, "b")];
        let selected = select_proofs(&inventory, u64::MAX).expect("select");
        assert_eq!(selected.len(), 1);
        assert!(matches!(total(&inventory), Err(WalletError::AmountOverflow)));
    }

    #[test]
    fn test_split_amount() {
        assert!(split_amount(0).is_empty());
        assert_eq!(split_amount(1), vec![1]);
        assert_eq!(split_amount(13), vec![1, 4, 8]);
        assert_eq!(split_amount(64), vec![64]);
        assert_eq!(split_amount(u64::MAX).len(), 64);
        assert_eq!(split_amount(13).iter().sum::<u64>(), 13);
    }
}
