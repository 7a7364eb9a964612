use crate::infra::{seed_repositories, SeededRepositories};
use clap::Args;
use kitflow::error::AppError;
use kitflow::ordering::{
    rows_from_path, BulkOrderBatch, BulkOutcome, CompanyId, DispatchPreference, EmployeeId,
    OrderService, OrderStatus, OrderSubmission, ProductId, RawOrderRow, RowStatus, SubmittedItem,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct BulkArgs {
    /// Path to a bulk order CSV (Employee ID, SKU, Size, Quantity)
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Company the batch is submitted for (defaults to the demo tenant)
    #[arg(long, default_value = "acme-logistics")]
    pub(crate) company: String,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Skip the approval and fulfilment portion of the demo.
    #[arg(long)]
    pub(crate) skip_lifecycle: bool,
}

pub(crate) fn run_bulk(args: BulkArgs) -> Result<(), AppError> {
    let BulkArgs { csv, company } = args;

    let rows = rows_from_path(&csv)?;
    println!("Loaded {} rows from {}", rows.len(), csv.display());

    let service = demo_service();
    let outcome = service.process_batch(BulkOrderBatch {
        company_id: CompanyId(company),
        rows,
    });

    render_bulk_outcome(&outcome);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { skip_lifecycle } = args;
    let service = demo_service();

    println!("Uniform ordering demo");

    println!("\nSingle order submission");
    let submission = OrderSubmission {
        employee_id: EmployeeId("emp-1001".to_string()),
        items: vec![
            SubmittedItem {
                product_id: ProductId("prd-001".to_string()),
                product_name: "Oxford work shirt".to_string(),
                size: "M".to_string(),
                quantity: 2,
                price: 2500,
            },
            SubmittedItem {
                product_id: ProductId("prd-004".to_string()),
                product_name: "Knit beanie".to_string(),
                size: "one-size".to_string(),
                quantity: 1,
                price: 900,
            },
        ],
        delivery_address: "12 Dock Road, Gate 4".to_string(),
        estimated_delivery: "3-5 business days".to_string(),
        dispatch_location: DispatchPreference::Direct,
    };
    let order = match service.submit_order(submission) {
        Ok(order) => order,
        Err(err) => {
            println!("  Submission rejected: {err}");
            return Ok(());
        }
    };
    println!(
        "- Order {} for {}: {} line(s), total {} minor units, status {}",
        order.id.0,
        order.employee_id.0,
        order.items.len(),
        order.total,
        order.status
    );

    println!("\nBulk batch intake");
    let batch = BulkOrderBatch {
        company_id: CompanyId("acme-logistics".to_string()),
        rows: demo_rows(),
    };
    let outcome = service.process_batch(batch);
    render_bulk_outcome(&outcome);

    if let Ok(consumed) = service.consumed_eligibility(&order.employee_id) {
        println!(
            "\nConsumed eligibility for {}: shirt {}, pant {}, shoe {}, jacket {}",
            order.employee_id.0, consumed.shirt, consumed.pant, consumed.shoe, consumed.jacket
        );
    }

    if skip_lifecycle {
        return Ok(());
    }

    println!("\nApproval and fulfilment");
    let order = match service.approve(&order.id, "ops@acme.example") {
        Ok(order) => order,
        Err(err) => {
            println!("  Approval failed: {err}");
            return Ok(());
        }
    };
    println!("- ops@acme.example approved {} -> {}", order.id.0, order.status);

    for target in [OrderStatus::Dispatched, OrderStatus::Delivered] {
        match service.update_status(&order.id, target) {
            Ok(updated) => println!("- Vendor moved {} -> {}", updated.id.0, updated.status),
            Err(err) => println!("  Status update failed: {err}"),
        }
    }

    Ok(())
}

type DemoService = OrderService<
    crate::infra::InMemoryEmployeeDirectory,
    crate::infra::InMemoryProductCatalog,
    crate::infra::InMemoryOrderStore,
    crate::infra::InMemoryCompanyDirectory,
>;

fn demo_service() -> Arc<DemoService> {
    let SeededRepositories {
        employees,
        catalog,
        orders,
        companies,
    } = seed_repositories();
    Arc::new(OrderService::new(employees, catalog, orders, companies))
}

fn demo_rows() -> Vec<RawOrderRow> {
    let row = |row_number, employee_id: &str, sku: &str, size: &str, quantity| RawOrderRow {
        employee_id: employee_id.to_string(),
        sku: sku.to_string(),
        size: size.to_string(),
        quantity,
        row_number,
    };

    vec![
        row(1, "emp-1001", "SKU-CARGO-PANT", "32", 1),
        row(2, "emp-1002", "SKU-OXF-SHIRT", "L", 2),
        // Size 44 is not stocked; this row fails while the rest commit.
        row(3, "emp-1002", "SKU-SAFETY-BOOT", "44", 1),
        row(4, "", "SKU-OXF-SHIRT", "M", 1),
    ]
}

fn render_bulk_outcome(outcome: &BulkOutcome) {
    for result in &outcome.results {
        match result.status {
            RowStatus::Success => {
                let order_id = result
                    .order_id
                    .as_ref()
                    .map(|id| id.0.as_str())
                    .unwrap_or("-");
                println!(
                    "  row {:>3} | {:<10} | {:<16} | ok -> {}",
                    result.row_number, result.employee_id, result.sku, order_id
                );
            }
            RowStatus::Failed => {
                let reason = result.error.as_deref().unwrap_or("unknown failure");
                println!(
                    "  row {:>3} | {:<10} | {:<16} | failed: {}",
                    result.row_number, result.employee_id, result.sku, reason
                );
            }
        }
    }
    println!(
        "  {} rows: {} committed, {} failed",
        outcome.summary.total, outcome.summary.successful, outcome.summary.failed
    );
}
