mod common;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;

use ceramerp_accounting::{
    AccountType, AccountingEntryInput, BankAccountInput, Period, TaxInput, TaxStatus, TaxType,
    TransactionInput, TransactionStatus, TransactionType,
};
use ceramerp_backend::Operation;
use ceramerp_backend::schema::{
    CUSTOMERS, FINANCIAL_TRANSACTIONS, PURCHASE_ORDERS, SALES_ORDERS, TAXES,
};
use ceramerp_client::ErpClient;
use ceramerp_parties::{CustomerId, SupplierId};

use common::{harness, seed_item, seed_stock, seed_warehouse};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn tx(
    on: NaiveDate,
    kind: TransactionType,
    status: TransactionStatus,
    amount: Decimal,
    category: Option<&str>,
) -> TransactionInput {
    TransactionInput {
        transaction_date: on,
        description: format!("{kind:?} on {on}"),
        transaction_type: kind,
        category: category.map(str::to_string),
        amount,
        status,
        bank_account_id: None,
    }
}

async fn record(client: &ErpClient, inputs: Vec<TransactionInput>) {
    for input in inputs {
        client.treasury().create_transaction(input).await.unwrap();
    }
}

#[tokio::test]
async fn monthly_revenue_groups_three_months_in_order() {
    let h = harness();
    use TransactionStatus::*;
    use TransactionType::*;
    record(
        &h.client,
        vec![
            tx(date(2024, 5, 20), Income, Completed, dec!(300), None),
            tx(date(2024, 3, 2), Income, Completed, dec!(100), None),
            tx(date(2024, 4, 9), Income, Completed, dec!(50.5), None),
            tx(date(2024, 3, 28), Income, Completed, dec!(20), None),
            tx(date(2024, 4, 10), Income, Pending, dec!(999), None),
            tx(date(2024, 4, 11), Expense, Completed, dec!(70), None),
            tx(date(2023, 11, 1), Income, Completed, dec!(5), None),
        ],
    )
    .await;

    let points = h.client.dashboard().revenue(date(2024, 5, 31)).await.unwrap();

    let summary: Vec<_> = points
        .iter()
        .map(|p| (p.year, p.month, p.revenue))
        .collect();
    assert_eq!(
        summary,
        vec![
            (2024, 3, dec!(120)),
            (2024, 4, dec!(50.5)),
            (2024, 5, dec!(300)),
        ]
    );
    assert_eq!(points[0].label, "Mar 2024");
}

#[tokio::test]
async fn cashflow_accumulates_net_in_date_order() {
    let h = harness();
    use TransactionStatus::*;
    use TransactionType::*;
    let today = date(2024, 6, 15);
    record(
        &h.client,
        vec![
            tx(date(2024, 6, 20), Expense, Pending, dec!(40), None),
            tx(date(2024, 6, 1), Income, Completed, dec!(100), None),
            tx(date(2024, 6, 1), Expense, Completed, dec!(30), None),
            tx(date(2024, 6, 10), Income, Completed, dec!(15), None),
            tx(date(2024, 8, 30), Income, Pending, dec!(1000), None),
        ],
    )
    .await;

    let points = h.client.dashboard().cashflow(today).await.unwrap();

    assert_eq!(points.len(), 3);
    let mut running = Decimal::ZERO;
    for point in &points {
        assert_eq!(point.net, point.inflow - point.outflow);
        running += point.net;
        assert_eq!(point.cumulative, running);
    }
    assert!(points.windows(2).all(|w| w[0].date < w[1].date));
    assert_eq!(points[0].net, dec!(70));
    assert_eq!(points[2].cumulative, dec!(45));
}

#[tokio::test]
async fn expenses_are_grouped_by_category() {
    let h = harness();
    use TransactionStatus::*;
    use TransactionType::*;
    record(
        &h.client,
        vec![
            tx(date(2024, 6, 1), Expense, Completed, dec!(80), Some("clay")),
            tx(date(2024, 6, 2), Expense, Completed, dec!(40), Some("energy")),
            tx(date(2024, 6, 3), Expense, Completed, dec!(30), Some("clay")),
            tx(date(2024, 6, 4), Expense, Completed, dec!(5), None),
            tx(date(2024, 6, 5), Expense, Pending, dec!(500), Some("energy")),
        ],
    )
    .await;

    let totals = h.client.dashboard().expenses(date(2024, 6, 30)).await.unwrap();

    let flat: Vec<_> = totals
        .iter()
        .map(|t| (t.category.as_str(), t.total))
        .collect();
    assert_eq!(
        flat,
        vec![
            ("clay", dec!(110)),
            ("energy", dec!(40)),
            ("uncategorized", dec!(5)),
        ]
    );
}

#[tokio::test]
async fn dashboard_is_cached_until_a_transaction_changes() {
    let h = harness();
    let today = date(2024, 6, 30);
    let dashboard = h.client.dashboard();

    assert!(dashboard.revenue(today).await.unwrap().is_empty());
    dashboard.revenue(today).await.unwrap();
    assert_eq!(h.data.call_count(Operation::Select, FINANCIAL_TRANSACTIONS), 1);

    record(
        &h.client,
        vec![tx(
            date(2024, 6, 3),
            TransactionType::Income,
            TransactionStatus::Completed,
            dec!(12),
            None,
        )],
    )
    .await;

    let points = dashboard.revenue(today).await.unwrap();
    assert_eq!(points.len(), 1);
    assert_eq!(h.data.call_count(Operation::Select, FINANCIAL_TRANSACTIONS), 2);
}

#[tokio::test]
async fn summary_counts_active_rows_and_pending_money() {
    let h = harness();
    let customer = CustomerId::new();
    h.data
        .seed(
            CUSTOMERS,
            json!([
                { "id": customer, "code": "C-1", "name": "Ativo", "active": true },
                { "code": "C-2", "name": "Inativo", "active": false },
            ]),
        )
        .unwrap();
    let item = seed_item(&h.data, "JAR-01");
    let warehouse = seed_warehouse(&h.data, "MAIN");
    let stock_id = seed_stock(&h.data, item, warehouse, dec!(2));
    h.client
        .stock()
        .adjust(
            stock_id,
            ceramerp_inventory::StockAdjustment {
                quantity: dec!(2),
                min_quantity: Some(dec!(5)),
                max_quantity: None,
            },
        )
        .await
        .unwrap();
    let supplier = SupplierId::new();
    h.data
        .seed(
            PURCHASE_ORDERS,
            json!([
                { "order_number": "PO-1", "supplier_id": supplier, "order_date": "2024-06-01",
                  "status": "sent", "subtotal": "0", "tax_amount": "0", "total": "0" },
                { "order_number": "PO-2", "supplier_id": supplier, "order_date": "2024-06-02",
                  "status": "received", "subtotal": "0", "tax_amount": "0", "total": "0" },
            ]),
        )
        .unwrap();
    h.data
        .seed(
            SALES_ORDERS,
            json!({ "order_number": "SO-1", "customer_id": customer, "order_date": "2024-06-03",
                    "status": "confirmed", "subtotal": "0", "tax_amount": "0", "total": "0" }),
        )
        .unwrap();
    use TransactionStatus::*;
    use TransactionType::*;
    record(
        &h.client,
        vec![
            tx(date(2024, 6, 5), Income, Pending, dec!(250), None),
            tx(date(2024, 6, 6), Expense, Pending, dec!(90), None),
            tx(date(2024, 6, 7), Income, Completed, dec!(1000), None),
        ],
    )
    .await;

    let summary = h.client.dashboard().summary().await.unwrap();

    assert_eq!(summary.active_customers, 1);
    assert_eq!(summary.active_items, 1);
    assert_eq!(summary.low_stock, 1);
    assert_eq!(summary.open_purchase_orders, 1);
    assert_eq!(summary.open_sales_orders, 1);
    assert_eq!(summary.pending_receivables, dec!(250));
    assert_eq!(summary.pending_payables, dec!(90));
}

#[tokio::test]
async fn bank_balances_split_completed_and_pending() {
    let h = harness();
    let treasury = h.client.treasury();
    let account = treasury
        .create_bank_account(BankAccountInput {
            name: "Conta principal".into(),
            bank_name: None,
            iban: None,
            balance: dec!(1000),
            active: true,
        })
        .await
        .unwrap();
    let mut income = tx(
        date(2024, 6, 1),
        TransactionType::Income,
        TransactionStatus::Completed,
        dec!(200),
        None,
    );
    income.bank_account_id = Some(account.id);
    let mut bill = tx(
        date(2024, 6, 2),
        TransactionType::Expense,
        TransactionStatus::Pending,
        dec!(50),
        None,
    );
    bill.bank_account_id = Some(account.id);
    treasury.create_transaction(income).await.unwrap();
    let bill = treasury.create_transaction(bill).await.unwrap();

    let balances = treasury.balances().await.unwrap();
    assert_eq!(balances.len(), 1);
    assert_eq!(balances[0].current, dec!(1200));
    assert_eq!(balances[0].pending, dec!(-50));
    assert_eq!(balances[0].projected, dec!(1150));

    let paid = treasury.mark_completed(bill.id).await.unwrap();
    assert_eq!(paid.status, TransactionStatus::Completed);
    let balances = treasury.balances().await.unwrap();
    assert_eq!(balances[0].current, dec!(1150));
    assert_eq!(balances[0].pending, Decimal::ZERO);
}

#[tokio::test]
async fn trial_balance_sums_each_account() {
    let h = harness();
    let accounting = h.client.accounting();
    let cash = accounting
        .create_account(ceramerp_accounting::ChartAccountInput {
            code: "11".into(),
            name: "Caixa".into(),
            account_type: AccountType::Asset,
        })
        .await
        .unwrap();
    let sales = accounting
        .create_account(ceramerp_accounting::ChartAccountInput {
            code: "71".into(),
            name: "Vendas".into(),
            account_type: AccountType::Revenue,
        })
        .await
        .unwrap();
    let on = date(2024, 6, 1);
    for entry in [
        AccountingEntryInput::debit(on, cash.id, "Sale 1", dec!(120)),
        AccountingEntryInput::credit(on, sales.id, "Sale 1", dec!(120)),
        AccountingEntryInput::debit(on, cash.id, "Sale 2", dec!(30)),
        AccountingEntryInput::credit(on, sales.id, "Sale 2", dec!(30)),
    ] {
        accounting.create_entry(entry).await.unwrap();
    }

    let balances = accounting.trial_balance().await.unwrap();

    let cash_row = balances.iter().find(|b| b.account_id == cash.id).unwrap();
    assert_eq!(cash_row.debit, dec!(150));
    assert_eq!(cash_row.credit, Decimal::ZERO);
    let sales_row = balances.iter().find(|b| b.account_id == sales.id).unwrap();
    assert_eq!(sales_row.credit, dec!(150));
    let debits: Decimal = balances.iter().map(|b| b.debit).sum();
    let credits: Decimal = balances.iter().map(|b| b.credit).sum();
    assert_eq!(debits, credits);
}

#[tokio::test]
async fn entry_with_both_sides_is_rejected() {
    let h = harness();
    let mut entry = AccountingEntryInput::debit(
        date(2024, 6, 1),
        ceramerp_accounting::AccountId::new(),
        "Both sides",
        dec!(10),
    );
    entry.credit = dec!(10);

    let err = h.client.accounting().create_entry(entry).await.unwrap_err();
    assert!(err.is_validation());
    assert!(h.notifier.all().is_empty());
}

#[tokio::test]
async fn taxes_upcoming_and_paid() {
    let h = harness();
    let taxes = h.client.taxes();
    let period: Period = "2024-05".parse().unwrap();
    let due_soon = taxes
        .create(TaxInput {
            tax_type: TaxType::Vat,
            period,
            amount: dec!(430),
            due_date: date(2024, 6, 20),
            status: TaxStatus::Pending,
            paid_date: None,
        })
        .await
        .unwrap();
    taxes
        .create(TaxInput {
            tax_type: TaxType::SocialSecurity,
            period,
            amount: dec!(210),
            due_date: date(2024, 9, 15),
            status: TaxStatus::Pending,
            paid_date: None,
        })
        .await
        .unwrap();

    let today = date(2024, 6, 10);
    let upcoming = taxes.upcoming(today, 30).await.unwrap();
    assert_eq!(upcoming.len(), 1);
    assert_eq!(upcoming[0].id, due_soon.id);

    let paid = taxes.mark_paid(due_soon.id, date(2024, 6, 18)).await.unwrap();
    assert_eq!(paid.status, TaxStatus::Paid);
    assert_eq!(paid.paid_date, Some(date(2024, 6, 18)));
    assert!(taxes.upcoming(today, 30).await.unwrap().is_empty());
    assert_eq!(h.data.rows(TAXES).len(), 2);
}

#[tokio::test]
async fn vat_summary_nets_sales_against_purchases() {
    let h = harness();
    let customer = CustomerId::new();
    let supplier = SupplierId::new();
    h.data
        .seed(
            SALES_ORDERS,
            json!([
                { "order_number": "SO-1", "customer_id": customer, "order_date": "2024-05-03",
                  "status": "invoiced", "subtotal": "1000", "tax_amount": "230", "total": "1230" },
                { "order_number": "SO-2", "customer_id": customer, "order_date": "2024-05-09",
                  "status": "draft", "subtotal": "100", "tax_amount": "23", "total": "123" },
                { "order_number": "SO-3", "customer_id": customer, "order_date": "2024-06-01",
                  "status": "shipped", "subtotal": "100", "tax_amount": "23", "total": "123" },
            ]),
        )
        .unwrap();
    h.data
        .seed(
            PURCHASE_ORDERS,
            json!([
                { "order_number": "PO-1", "supplier_id": supplier, "order_date": "2024-05-31",
                  "status": "received", "subtotal": "400", "tax_amount": "92", "total": "492" },
                { "order_number": "PO-2", "supplier_id": supplier, "order_date": "2024-05-15",
                  "status": "cancelled", "subtotal": "50", "tax_amount": "11.5", "total": "61.5" },
            ]),
        )
        .unwrap();

    let vat = h
        .client
        .taxes()
        .vat_summary("2024-05".parse().unwrap())
        .await
        .unwrap();

    assert_eq!(vat.collected, dec!(230));
    assert_eq!(vat.deductible, dec!(92));
    assert_eq!(vat.payable, dec!(138));
}
