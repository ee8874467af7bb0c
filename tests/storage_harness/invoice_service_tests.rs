//! Macro-generated test suite for `InvoiceService` contract validation.
//!
//! The `invoice_service_tests!` macro generates a test module that validates
//! any `InvoiceService` implementation: inserts, updates that never touch
//! the date, idempotent deletes, search and pagination.
//!
//! # Usage
//!
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//!
//! use storage_harness::*;
//!
//! invoice_service_tests!(seeded_in_memory().await);
//! ```
//!
//! `$factory` must evaluate to a service already holding the customers from
//! `harness_customers()` and no invoices. It is re-evaluated for each test.

#[macro_export]
macro_rules! invoice_service_tests {
    ($factory:expr) => {
        mod invoice_service_contract_tests {
            use super::*;
            use invoice_desk::core::model::InvoiceStatus;
            use invoice_desk::core::service::{ITEMS_PER_PAGE, InvoiceService};

            // ==================================================================
            // Customers
            // ==================================================================

            #[tokio::test]
            async fn test_fetch_customers_sorted_by_name() {
                let service = $factory;
                let customers = service.fetch_customers().await.unwrap();
                let names: Vec<&str> = customers.iter().map(|c| c.name.as_str()).collect();
                assert_eq!(names, vec!["Amy Burns", "Balazs Orban", "Michael Novotny"]);
                assert_eq!(
                    customers[0].image_url.as_deref(),
                    Some("/customers/amy-burns.png")
                );
            }

            // ==================================================================
            // Insert & fetch
            // ==================================================================

            #[tokio::test]
            async fn test_insert_and_fetch_by_id() {
                let service = $factory;
                let created = service
                    .insert_invoice(new_invoice(
                        "c1",
                        1250,
                        InvoiceStatus::Pending,
                        date(2024, 3, 1),
                    ))
                    .await
                    .unwrap();
                assert!(!created.id.is_empty());
                assert_eq!(created.amount, 1250);

                let fetched = service
                    .fetch_invoice_by_id(&created.id)
                    .await
                    .unwrap()
                    .expect("invoice should exist after insert");
                assert_eq!(fetched, created);
            }

            #[tokio::test]
            async fn test_fetch_unknown_id_is_none() {
                let service = $factory;
                let fetched = service
                    .fetch_invoice_by_id("00000000-0000-0000-0000-000000000000")
                    .await
                    .unwrap();
                assert!(fetched.is_none());
            }

            #[tokio::test]
            async fn test_insert_with_unknown_customer_fails() {
                let service = $factory;
                let result = service
                    .insert_invoice(new_invoice(
                        "ghost",
                        100,
                        InvoiceStatus::Paid,
                        date(2024, 3, 1),
                    ))
                    .await;
                let err = result.expect_err("unknown customer should be rejected");
                assert!(
                    err.to_string().starts_with("Database Error:"),
                    "unexpected message: {}",
                    err
                );
            }

            // ==================================================================
            // Update
            // ==================================================================

            #[tokio::test]
            async fn test_update_changes_fields_but_not_date() {
                let service = $factory;
                let created = service
                    .insert_invoice(new_invoice(
                        "c1",
                        1250,
                        InvoiceStatus::Pending,
                        date(2023, 1, 15),
                    ))
                    .await
                    .unwrap();

                let rows = service
                    .update_invoice(&created.id, changes("c2", 500, InvoiceStatus::Paid))
                    .await
                    .unwrap();
                assert_eq!(rows, 1);

                let updated = service
                    .fetch_invoice_by_id(&created.id)
                    .await
                    .unwrap()
                    .unwrap();
                assert_eq!(updated.customer_id, "c2");
                assert_eq!(updated.amount, 500);
                assert_eq!(updated.status, InvoiceStatus::Paid);
                assert_eq!(updated.date, date(2023, 1, 15));
            }

            #[tokio::test]
            async fn test_update_unknown_id_affects_no_rows() {
                let service = $factory;
                let rows = service
                    .update_invoice(
                        "00000000-0000-0000-0000-000000000000",
                        changes("c1", 1, InvoiceStatus::Paid),
                    )
                    .await
                    .unwrap();
                assert_eq!(rows, 0);
            }

            // ==================================================================
            // Delete
            // ==================================================================

            #[tokio::test]
            async fn test_delete_existing_then_again() {
                let service = $factory;
                let created = service
                    .insert_invoice(new_invoice(
                        "c3",
                        999,
                        InvoiceStatus::Pending,
                        date(2024, 3, 1),
                    ))
                    .await
                    .unwrap();

                assert_eq!(service.delete_invoice(&created.id).await.unwrap(), 1);
                assert!(
                    service
                        .fetch_invoice_by_id(&created.id)
                        .await
                        .unwrap()
                        .is_none()
                );
                // deleting again is not an error
                assert_eq!(service.delete_invoice(&created.id).await.unwrap(), 0);
            }

            // ==================================================================
            // Search & pagination
            // ==================================================================

            #[tokio::test]
            async fn test_filtered_invoices_join_customer() {
                let service = $factory;
                service
                    .insert_invoice(new_invoice(
                        "c1",
                        15795,
                        InvoiceStatus::Pending,
                        date(2022, 12, 6),
                    ))
                    .await
                    .unwrap();
                service
                    .insert_invoice(new_invoice(
                        "c2",
                        20348,
                        InvoiceStatus::Paid,
                        date(2022, 11, 14),
                    ))
                    .await
                    .unwrap();

                let all = service.fetch_filtered_invoices("", 1).await.unwrap();
                assert_eq!(all.len(), 2);
                // newest first
                assert_eq!(all[0].name, "Amy Burns");
                assert_eq!(all[0].email, "amy@burns.com");
                assert_eq!(all[1].name, "Balazs Orban");

                let by_name = service.fetch_filtered_invoices("balazs", 1).await.unwrap();
                assert_eq!(by_name.len(), 1);
                assert_eq!(by_name[0].customer_id, "c2");

                let by_status = service.fetch_filtered_invoices("PAID", 1).await.unwrap();
                assert_eq!(by_status.len(), 1);

                let by_date = service.fetch_filtered_invoices("2022-12", 1).await.unwrap();
                assert_eq!(by_date.len(), 1);

                let none = service.fetch_filtered_invoices("zzz", 1).await.unwrap();
                assert!(none.is_empty());
            }

            #[tokio::test]
            async fn test_pagination() {
                let service = $factory;
                for day in 1..=(ITEMS_PER_PAGE as u32 + 2) {
                    service
                        .insert_invoice(new_invoice(
                            "c1",
                            100 * day as i64,
                            InvoiceStatus::Pending,
                            date(2024, 1, day),
                        ))
                        .await
                        .unwrap();
                }

                assert_eq!(service.fetch_invoice_pages("").await.unwrap(), 2);
                assert_eq!(service.fetch_invoice_pages("zzz").await.unwrap(), 0);

                let first = service.fetch_filtered_invoices("", 1).await.unwrap();
                let second = service.fetch_filtered_invoices("", 2).await.unwrap();
                assert_eq!(first.len(), ITEMS_PER_PAGE);
                assert_eq!(second.len(), 2);
                assert_eq!(first[0].date, date(2024, 1, ITEMS_PER_PAGE as u32 + 2));
                assert_eq!(second[1].date, date(2024, 1, 1));

                let third = service.fetch_filtered_invoices("", 3).await.unwrap();
                assert!(third.is_empty());
            }

            #[tokio::test]
            async fn test_page_far_past_the_end_is_empty() {
                let service = $factory;
                service
                    .insert_invoice(new_invoice("c1", 100, InvoiceStatus::Paid, date(2024, 1, 1)))
                    .await
                    .unwrap();

                let rows = service.fetch_filtered_invoices("", usize::MAX).await.unwrap();
                assert!(rows.is_empty());
            }

            // ==================================================================
            // Concurrency
            // ==================================================================

            #[tokio::test]
            async fn test_concurrent_inserts() {
                let service = std::sync::Arc::new($factory);
                let mut handles = Vec::new();
                for i in 0..5i64 {
                    let service = service.clone();
                    handles.push(tokio::spawn(async move {
                        service
                            .insert_invoice(new_invoice(
                                "c1",
                                100 + i,
                                InvoiceStatus::Pending,
                                date(2024, 2, 1),
                            ))
                            .await
                    }));
                }
                for handle in handles {
                    handle.await.unwrap().unwrap();
                }
                let rows = service.fetch_filtered_invoices("", 1).await.unwrap();
                assert_eq!(rows.len(), 5);
            }
        }
    };
}
