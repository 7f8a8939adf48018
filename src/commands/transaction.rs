//! Transaction command handlers. Amounts are Rupiah and always positive; the direction says
//! whether the money came in or went out.

use crate::args::{IdArgs, ListArgs, TransactionAddArgs, TransactionUpdateArgs};
use crate::commands::render::render;
use crate::commands::{list_params, owned, plural, Out};
use crate::error::{ErrorType, IntoResult};
use crate::ledger;
use crate::model::{Amount, Transaction, TransactionDraft};
use crate::repo::Repository;
use crate::{Config, Result};
use anyhow::ensure;

/// The largest amount one transaction may carry, one quadrillion Rupiah.
const MAX_AMOUNT: i64 = 1_000_000_000_000_000;

/// Records a transaction. The date defaults to today.
///
/// # Errors
/// - Returns a `Request` error if the category is empty or the amount is not positive or above
///   [`MAX_AMOUNT`].
pub async fn transaction_add(
    config: Config,
    args: TransactionAddArgs,
) -> Result<Out<Transaction>> {
    let session = config.session()?;
    let draft = TransactionDraft::new(
        args.date()
            .unwrap_or_else(|| chrono::Local::now().date_naive()),
        args.category().trim(),
        args.description(),
        args.amount(),
        args.direction(),
    );
    validate(&draft).pub_result(ErrorType::Request)?;

    let txn: Transaction = config
        .db()
        .insert(&session.student_id, draft)
        .await
        .pub_result(ErrorType::Database)?;
    Ok(Out::new(summary("Recorded", &txn), txn))
}

/// Lists transactions by date. The message carries the totals of the listed transactions.
pub async fn transaction_list(config: Config, args: ListArgs) -> Result<Out<Vec<Transaction>>> {
    let session = config.session()?;
    let params = list_params(session)
        .from(args.from())
        .to(args.to())
        .order(args.order());
    let txns: Vec<Transaction> = config
        .db()
        .list(&params)
        .await
        .pub_result(ErrorType::Database)?;
    let rows = render(&txns, args.format()).pub_result(ErrorType::Request)?;
    let totals = ledger::totals(&txns);
    let message = format!(
        "{} transaction{}: income {}, expense {}, balance {}",
        txns.len(),
        plural(txns.len()),
        totals.income,
        totals.expense,
        totals.balance
    );
    Ok(Out::new(message, txns).with_rows(rows))
}

/// Changes the given fields of a transaction and leaves the others as they are.
pub async fn transaction_update(
    config: Config,
    args: TransactionUpdateArgs,
) -> Result<Out<Transaction>> {
    let session = config.session()?;
    let current: Transaction = owned(&config, session, args.id()).await?;

    let mut draft = current.fields().clone();
    if let Some(date) = args.date() {
        draft.date = date;
    }
    if let Some(category) = args.category() {
        draft.category = category.trim().to_string();
    }
    if let Some(description) = args.description() {
        draft.description = description.to_string();
    }
    if let Some(amount) = args.amount() {
        draft.amount = amount;
    }
    if let Some(direction) = args.direction() {
        draft.direction = direction;
    }
    validate(&draft).pub_result(ErrorType::Request)?;

    let txn: Transaction = config
        .db()
        .update(current.id(), draft)
        .await
        .pub_result(ErrorType::Database)?;
    Ok(Out::new(summary("Updated", &txn), txn))
}

pub async fn transaction_delete(config: Config, args: IdArgs) -> Result<Out<String>> {
    let session = config.session()?;
    let txn: Transaction = owned(&config, session, args.id()).await?;
    Repository::<Transaction>::delete(config.db(), txn.id())
        .await
        .pub_result(ErrorType::Database)?;
    Ok(Out::new(
        format!("Deleted transaction {}", txn.id()),
        txn.id().to_string(),
    ))
}

fn validate(draft: &TransactionDraft) -> Result<()> {
    ensure!(!draft.category.is_empty(), "The category cannot be empty");
    ensure!(
        draft.amount > Amount::ZERO,
        "The amount must be positive, got {}",
        draft.amount
    );
    ensure!(
        draft.amount <= Amount::from(MAX_AMOUNT),
        "The amount cannot be more than {}, got {}",
        Amount::from(MAX_AMOUNT),
        draft.amount
    );
    Ok(())
}

fn summary(verb: &str, txn: &Transaction) -> String {
    let fields = txn.fields();
    format!(
        "{verb} {} {} for {} on {} ({})",
        fields.direction,
        fields.amount,
        fields.category,
        fields.date,
        txn.id()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::OutputFormat;
    use crate::commands::Rows;
    use crate::error::error_type;
    use crate::model::Direction;
    use crate::repo::SortOrder;
    use crate::test::TestEnv;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, month, day).unwrap()
    }

    async fn add(env: &TestEnv, d: NaiveDate, category: &str, amount: i64, dir: Direction) {
        let args = TransactionAddArgs::new(d, category, amount, dir);
        transaction_add(env.config(), args).await.unwrap();
    }

    #[tokio::test]
    async fn test_transaction_add() {
        let env = TestEnv::logged_in().await;
        let args = TransactionAddArgs::new(date(1, 5), "Makan", 25000i64, Direction::Out);
        let out = transaction_add(env.config(), args).await.unwrap();
        assert!(out
            .message()
            .starts_with("Recorded out Rp 25.000 for Makan on 2024-01-05"));
        assert_eq!(out.structure().unwrap().fields().amount, Amount::from(25000i64));
    }

    #[tokio::test]
    async fn test_transaction_add_rejects_non_positive_amount() {
        let env = TestEnv::logged_in().await;
        let args = TransactionAddArgs::new(date(1, 5), "Makan", 0i64, Direction::Out);
        let err = transaction_add(env.config(), args).await.unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Request));

        let args = TransactionAddArgs::new(date(1, 5), " ", 100i64, Direction::Out);
        let err = transaction_add(env.config(), args).await.unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Request));
    }

    #[tokio::test]
    async fn test_transaction_add_rejects_huge_amount() {
        let env = TestEnv::logged_in().await;
        let huge = Amount::from_str("50000000000000000000000000000").unwrap();
        let args = TransactionAddArgs::new(date(1, 5), "Lotre", huge, Direction::In);
        let err = transaction_add(env.config(), args).await.unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Request));

        let args = TransactionAddArgs::new(date(1, 5), "Gaji", MAX_AMOUNT, Direction::In);
        let added = transaction_add(env.config(), args).await.unwrap();
        let id = added.structure().unwrap().id().to_string();
        let args = TransactionUpdateArgs::new(&id).with_amount(huge);
        let err = transaction_update(env.config(), args).await.unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Request));
    }

    #[tokio::test]
    async fn test_transaction_list_range_and_totals() {
        let env = TestEnv::logged_in().await;
        add(&env, date(1, 1), "Beasiswa", 100, Direction::In).await;
        add(&env, date(1, 15), "Makan", 40, Direction::Out).await;
        add(&env, date(2, 1), "Buku", 60, Direction::Out).await;

        let out = transaction_list(env.config(), ListArgs::default())
            .await
            .unwrap();
        assert_eq!(
            out.message(),
            "3 transactions: income Rp 100, expense Rp 100, balance Rp 0"
        );

        let args = ListArgs::new(Some(date(1, 10)), None, SortOrder::Desc)
            .with_format(OutputFormat::Csv);
        let out = transaction_list(env.config(), args).await.unwrap();
        let categories: Vec<&str> = out
            .structure()
            .unwrap()
            .iter()
            .map(|t| t.fields().category.as_str())
            .collect();
        assert_eq!(categories, vec!["Buku", "Makan"]);
        assert!(matches!(out.rows(), Some(Rows::Csv(_))));
    }

    #[tokio::test]
    async fn test_transaction_update_merges() {
        let env = TestEnv::logged_in().await;
        let args = TransactionAddArgs::new(date(1, 5), "Makan", 25000i64, Direction::Out);
        let added = transaction_add(env.config(), args).await.unwrap();
        let id = added.structure().unwrap().id().to_string();

        let args = TransactionUpdateArgs::new(&id).with_amount(30000i64);
        let out = transaction_update(env.config(), args).await.unwrap();
        let fields = out.structure().unwrap().fields();
        assert_eq!(fields.amount, Amount::from(30000i64));
        assert_eq!(fields.category, "Makan");
        assert_eq!(fields.date, date(1, 5));

        let args = TransactionUpdateArgs::new("missing").with_category("Transport");
        let err = transaction_update(env.config(), args).await.unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Request));
    }

    #[tokio::test]
    async fn test_transaction_delete_other_student() {
        let env = TestEnv::logged_in().await;
        let other = env.other_student("2021002").await;
        let draft = TransactionDraft::new(date(1, 5), "Makan", "", 10i64, Direction::Out);
        let theirs: Transaction = env
            .config()
            .db()
            .insert(&other.student_id, draft)
            .await
            .unwrap();

        let err = transaction_delete(env.config(), IdArgs::new(theirs.id()))
            .await
            .unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Request));
        assert!(format!("{err:#}").contains("No transaction found"), "{err:#}");
        let still_there: Option<Transaction> = env.config().db().get(theirs.id()).await.unwrap();
        assert!(still_there.is_some());
    }
}
