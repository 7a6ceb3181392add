use chrono::{Duration, TimeZone, Utc};
use hopewell_storage::{
    database::{client::DatabaseClient, store::TransactionalStore},
    models::{donation::*, donation_order::*},
    page_token::PageTokenable,
    stores::{donation::DonationStore, donation_order::DonationOrderStore},
};
use testcontainers::clients::Cli;

mod common;

fn new_order(order_id: &str) -> NewDonationOrderRow {
    NewDonationOrderRow {
        order_id: order_id.to_string(),
        create_time: Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
        receipt: format!("rcpt_{}", order_id),
        amount_minor: 100_000,
        currency: "INR".to_string(),
    }
}

fn new_donation(donation_id: &str, order_id: &str, day: u32) -> NewDonationRow {
    NewDonationRow {
        donation_id: donation_id.to_string(),
        create_time: Utc.with_ymd_and_hms(2024, 3, day, 10, 0, 0).unwrap(),
        order_id: order_id.to_string(),
        donor_name: "Asha Rao".to_string(),
        donor_email: "asha@example.org".to_string(),
        amount_minor: 100_000,
        currency: "INR".to_string(),
        status: DonationStatus::Completed,
    }
}

#[tokio::test]
#[ignore = "requires docker"]
async fn duplicate_settlement_inserts_once() -> Result<(), anyhow::Error> {
    let docker_cli = Cli::default();
    let pg = common::setup_pg_container(&docker_cli).await?;
    let store = pg.client.on_demand();

    store.add_donation_order(new_order("order_1")).await?;

    let first = store
        .insert_donation_if_absent(new_donation("pay_1", "order_1", 2))
        .await?;
    let second = store
        .insert_donation_if_absent(new_donation("pay_1", "order_1", 3))
        .await?;

    let InsertedDonation::Inserted(inserted) = first else {
        panic!("first insert should create the row");
    };
    assert_eq!(second, InsertedDonation::AlreadyExists(inserted));
    assert_eq!(store.count_donations(None).await?, 1);
    Ok(())
}

#[tokio::test]
#[ignore = "requires docker"]
async fn concurrent_settlements_record_one_donation() -> Result<(), anyhow::Error> {
    let docker_cli = Cli::default();
    let pg = common::setup_pg_container(&docker_cli).await?;
    pg.client
        .on_demand()
        .add_donation_order(new_order("order_1"))
        .await?;

    let first = pg.client.begin().await?;
    let second = pg.client.begin().await?;

    let first_result = first
        .insert_donation_if_absent(new_donation("pay_1", "order_1", 2))
        .await?;

    // Waits on the uncommitted row until `first` finishes.
    let racing = tokio::spawn(async move {
        let result = second
            .insert_donation_if_absent(new_donation("pay_1", "order_1", 3))
            .await;
        (second, result)
    });
    tokio::time::sleep(std::time::Duration::from_millis(300)).await;
    assert!(!racing.is_finished());

    first.commit().await?;
    let (second, second_result) = racing.await?;
    let second_result = second_result?;
    second.commit().await?;

    let InsertedDonation::Inserted(inserted) = first_result else {
        panic!("first settlement should create the row");
    };
    assert_eq!(second_result, InsertedDonation::AlreadyExists(inserted));
    assert_eq!(pg.client.on_demand().count_donations(None).await?, 1);
    Ok(())
}

#[tokio::test]
#[ignore = "requires docker"]
async fn order_and_donation_commit_together() -> Result<(), anyhow::Error> {
    let docker_cli = Cli::default();
    let pg = common::setup_pg_container(&docker_cli).await?;

    let txn = pg.client.begin().await?;
    txn.add_donation_order(new_order("order_1")).await?;
    txn.insert_donation_if_absent(new_donation("pay_1", "order_1", 2))
        .await?;
    txn.rollback().await?;
    assert_eq!(pg.client.on_demand().count_donations(None).await?, 0);

    let txn = pg.client.begin().await?;
    txn.add_donation_order(new_order("order_1")).await?;
    txn.insert_donation_if_absent(new_donation("pay_1", "order_1", 2))
        .await?;
    txn.commit().await?;
    assert!(pg
        .client
        .on_demand()
        .find_donation_by_id("pay_1".to_string())
        .await?
        .is_some());
    Ok(())
}

#[tokio::test]
#[ignore = "requires docker"]
async fn list_donations_pages_newest_first() -> Result<(), anyhow::Error> {
    let docker_cli = Cli::default();
    let pg = common::setup_pg_container(&docker_cli).await?;
    let store = pg.client.on_demand();

    store.add_donation_order(new_order("order_1")).await?;
    for day in 1..=5 {
        store
            .insert_donation_if_absent(new_donation(&format!("pay_{}", day), "order_1", day))
            .await?;
    }

    let (first_page, total) = store.list_and_count_donations(3, None, None).await?;
    assert_eq!(total, 5);
    let ids: Vec<_> = first_page.iter().map(|r| r.donation_id.as_str()).collect();
    assert_eq!(ids, vec!["pay_5", "pay_4", "pay_3"]);

    // The last row of an over-fetched page is the first row of the next page.
    let token = first_page[2].page_token();
    let second_page = store.list_donations(3, Some(token), None).await?;
    let ids: Vec<_> = second_page.iter().map(|r| r.donation_id.as_str()).collect();
    assert_eq!(ids, vec!["pay_3", "pay_2", "pay_1"]);

    assert_eq!(
        store
            .count_donations(Some(DonationStatus::Failed))
            .await?,
        0
    );
    Ok(())
}

#[tokio::test]
#[ignore = "requires docker"]
async fn list_donations_between_is_half_open() -> Result<(), anyhow::Error> {
    let docker_cli = Cli::default();
    let pg = common::setup_pg_container(&docker_cli).await?;
    let store = pg.client.on_demand();

    store.add_donation_order(new_order("order_1")).await?;
    for day in [1, 2, 3] {
        store
            .insert_donation_if_absent(new_donation(&format!("pay_{}", day), "order_1", day))
            .await?;
    }

    let start = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
    let rows = store
        .list_donations_between(start, start + Duration::days(2), DonationStatus::Completed)
        .await?;
    let ids: Vec<_> = rows.iter().map(|r| r.donation_id.as_str()).collect();
    assert_eq!(ids, vec!["pay_1", "pay_2"]);
    Ok(())
}
