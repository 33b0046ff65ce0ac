use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rand::Rng;
use tokio::sync::Mutex;

use crate::domain::UserId;

/// A fabricated placeholder account. Nothing about it exists outside this process.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Account {
    pub user_id: UserId,
    pub phone: String,
    pub added: DateTime<Utc>,
}

impl Account {
    pub fn synthetic<R: Rng>(user_id: UserId, rng: &mut R) -> Self {
        Self {
            user_id,
            phone: synthetic_phone(rng),
            added: Utc::now(),
        }
    }
}

/// `+1` followed by ten digits, never starting with zero.
pub fn synthetic_phone<R: Rng>(rng: &mut R) -> String {
    let n: u64 = rng.gen_range(1_000_000_000..=9_999_999_999);
    format!("+1{n}")
}

/// Append-only in-memory account list, lost on restart.
#[derive(Debug, Default)]
pub struct AccountStore {
    inner: Mutex<Vec<Account>>,
}

impl AccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends unconditionally; the same user may hold any number of entries.
    pub async fn add(&self, account: Account) {
        self.inner.lock().await.push(account);
    }

    /// All accounts recorded for `user_id`, in insertion order.
    pub async fn list_for(&self, user_id: UserId) -> Vec<Account> {
        self.inner
            .lock()
            .await
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect()
    }

    pub async fn count(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn distinct_users(&self) -> usize {
        self.inner
            .lock()
            .await
            .iter()
            .map(|a| a.user_id)
            .collect::<HashSet<_>>()
            .len()
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    fn is_synthetic_phone(phone: &str) -> bool {
        let Some(digits) = phone.strip_prefix("+1") else {
            return false;
        };
        digits.len() == 10 && digits.bytes().all(|b| b.is_ascii_digit()) && !digits.starts_with('0')
    }

    #[test]
    fn phone_numbers_have_us_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let phone = synthetic_phone(&mut rng);
            assert!(is_synthetic_phone(&phone), "bad phone: {phone}");
        }
    }

    #[tokio::test]
    async fn duplicates_count_once_per_user() {
        let store = AccountStore::new();
        let mut rng = StdRng::seed_from_u64(1);

        store.add(Account::synthetic(UserId(1), &mut rng)).await;
        store.add(Account::synthetic(UserId(1), &mut rng)).await;
        store.add(Account::synthetic(UserId(2), &mut rng)).await;

        assert_eq!(store.count().await, 3);
        assert_eq!(store.distinct_users().await, 2);
    }

    #[tokio::test]
    async fn list_for_filters_and_keeps_insertion_order() {
        let store = AccountStore::new();
        let mut rng = StdRng::seed_from_u64(2);

        let first = Account::synthetic(UserId(1), &mut rng);
        let other = Account::synthetic(UserId(9), &mut rng);
        let second = Account::synthetic(UserId(1), &mut rng);
        store.add(first.clone()).await;
        store.add(other).await;
        store.add(second.clone()).await;

        assert_eq!(store.list_for(UserId(1)).await, vec![first, second]);
        assert!(store.list_for(UserId(3)).await.is_empty());
    }

    #[tokio::test]
    async fn empty_store_reports_zeroes() {
        let store = AccountStore::new();
        assert_eq!(store.count().await, 0);
        assert_eq!(store.distinct_users().await, 0);
    }
}
