//! Command-line surface for the ministry planning API: one subcommand
//! per page of the original web frontend. Mutating commands check the
//! same role guard the pages used to disable their buttons, then let
//! the server make the real decision.

use agriplan::calendar;
use agriplan::client::{
    ApiClient, BreakdownPayload, IndicatorPayload, PerformancePayload, PerformanceQuery,
    PlanPayload, PlanQuery, UserPayload,
};
use agriplan::report::{self, GroupLabeler, PlanIndex, RowFilter};
use agriplan::session::{pages, AccessPolicy, Session};
use agriplan::types::{PlanAction, Quarter, Role, Status};
use agriplan::workflow;
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "agriplan-cli",
    version,
    about = "Ministry planning and reporting client"
)]
struct Cli {
    /// Base URL of the ministry API.
    #[arg(
        long,
        global = true,
        env = "AGRIPLAN_API_URL",
        default_value = "http://localhost:8000/"
    )]
    api_url: String,

    /// API token (see `agriplan-cli login`).
    #[arg(long, global = true, env = "AGRIPLAN_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Exchange a username and password for an API token.
    Login {
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Show the authenticated user's profile.
    Me,
    /// Sector administration (superuser only).
    Sectors {
        #[command(subcommand)]
        action: CrudCmd,
    },
    /// Department administration (superuser only).
    Departments {
        #[command(subcommand)]
        action: DepartmentCmd,
    },
    /// Indicator administration (superuser only).
    Indicators {
        #[command(subcommand)]
        action: IndicatorCmd,
    },
    /// Annual plans: yearly targets per indicator.
    Plans {
        #[command(subcommand)]
        action: PlanCmd,
    },
    /// Quarterly breakdown encoding (Lead Executive Body).
    Breakdowns {
        #[command(subcommand)]
        action: BreakdownCmd,
    },
    /// Quarterly performance encoding (Lead Executive Body).
    Performances {
        #[command(subcommand)]
        action: PerformanceCmd,
    },
    /// State Minister review queue: SUBMITTED records.
    Reviews {
        #[command(subcommand)]
        action: ReviewCmd,
    },
    /// Strategic Affairs validation queue: APPROVED records.
    Validations {
        #[command(subcommand)]
        action: GateCmd,
    },
    /// Executive final-approval queue: VALIDATED records.
    FinalApprovals {
        #[command(subcommand)]
        action: GateCmd,
    },
    /// Read-only minister dashboard: FINAL_APPROVED records.
    MinisterView {
        #[command(flatten)]
        filters: ListFilters,
    },
    /// Attach an advisor note to a breakdown without moving its status.
    Advise {
        breakdown: i64,
        #[arg(long)]
        note: String,
    },
    /// User administration (superuser only).
    Users {
        #[command(subcommand)]
        action: UserCmd,
    },
}

/// Shared list filters; `year` is an Ethiopian calendar year.
#[derive(clap::Args, Clone, Default)]
struct ListFilters {
    /// Ethiopian calendar year, e.g. 2017.
    #[arg(long)]
    year: Option<i32>,
    #[arg(long)]
    sector: Option<i64>,
    #[arg(long)]
    department: Option<i64>,
    /// Free-text search across indicator, department, sector, and unit.
    #[arg(long)]
    search: Option<String>,
}

#[derive(Subcommand)]
enum CrudCmd {
    List,
    Create { name: String },
    Update { id: i64, name: String },
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum DepartmentCmd {
    List {
        #[arg(long)]
        sector: Option<i64>,
    },
    Create {
        name: String,
        #[arg(long)]
        sector: i64,
    },
    Update {
        id: i64,
        name: String,
        #[arg(long)]
        sector: i64,
    },
    Delete {
        id: i64,
    },
}

#[derive(Subcommand)]
enum IndicatorCmd {
    List {
        #[arg(long)]
        department: Option<i64>,
    },
    Create {
        name: String,
        #[arg(long)]
        department: i64,
        #[arg(long, default_value = "")]
        unit: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long = "group")]
        groups: Vec<i64>,
    },
    Update {
        id: i64,
        name: String,
        #[arg(long)]
        department: i64,
        #[arg(long, default_value = "")]
        unit: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long = "group")]
        groups: Vec<i64>,
    },
    Delete {
        id: i64,
    },
}

#[derive(Subcommand)]
enum PlanCmd {
    List {
        #[command(flatten)]
        filters: ListFilters,
    },
    Create {
        /// Ethiopian calendar year.
        #[arg(long)]
        year: i32,
        #[arg(long)]
        indicator: i64,
        #[arg(long)]
        target: Decimal,
    },
    Update {
        id: i64,
        /// Ethiopian calendar year.
        #[arg(long)]
        year: i32,
        #[arg(long)]
        indicator: i64,
        #[arg(long)]
        target: Decimal,
    },
    Delete {
        id: i64,
    },
}

#[derive(Subcommand)]
enum BreakdownCmd {
    List,
    /// Create or replace the quarterly allocation for a plan.
    Set {
        #[arg(long)]
        plan: i64,
        #[arg(long)]
        q1: Decimal,
        #[arg(long)]
        q2: Decimal,
        #[arg(long)]
        q3: Decimal,
        #[arg(long)]
        q4: Decimal,
    },
    /// Submit a draft or rejected breakdown to the State Minister.
    Submit {
        id: i64,
    },
    Delete {
        id: i64,
    },
}

#[derive(Subcommand)]
enum PerformanceCmd {
    List {
        /// Ethiopian calendar year.
        #[arg(long)]
        year: Option<i32>,
        /// Quarter 1-4.
        #[arg(long)]
        quarter: Option<u8>,
    },
    /// Create or replace a quarter's actual value for a plan.
    Set {
        #[arg(long)]
        plan: i64,
        /// Quarter 1-4.
        #[arg(long)]
        quarter: u8,
        #[arg(long)]
        value: Decimal,
    },
    Submit {
        id: i64,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum RecordKind {
    Breakdown,
    Performance,
}

#[derive(Subcommand)]
enum ReviewCmd {
    List {
        #[command(flatten)]
        filters: ListFilters,
    },
    Approve {
        kind: RecordKind,
        id: i64,
        #[arg(long, default_value = "")]
        comment: String,
    },
    Reject {
        kind: RecordKind,
        id: i64,
        #[arg(long, default_value = "")]
        comment: String,
    },
    /// Hand everything currently APPROVED to Strategic Affairs in one
    /// batched call.
    SubmitToStrategic,
}

/// Validate/final-approve queues share a shape: list, advance, reject.
#[derive(Subcommand)]
enum GateCmd {
    List {
        #[command(flatten)]
        filters: ListFilters,
    },
    Advance {
        kind: RecordKind,
        id: i64,
    },
    Reject {
        kind: RecordKind,
        id: i64,
        #[arg(long, default_value = "")]
        comment: String,
    },
}

#[derive(Subcommand)]
enum UserCmd {
    List,
    Create {
        username: String,
        #[arg(long)]
        role: Role,
        #[arg(long, default_value = "")]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long)]
        sector: Option<i64>,
        #[arg(long)]
        department: Option<i64>,
    },
    Update {
        id: i64,
        username: String,
        #[arg(long)]
        role: Role,
        #[arg(long, default_value = "")]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long)]
        sector: Option<i64>,
        #[arg(long)]
        department: Option<i64>,
        #[arg(long, default_value_t = true)]
        active: bool,
    },
    Delete {
        id: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("agriplan=warn")),
        )
        .init();

    let cli = Cli::parse();

    if let Command::Login { username, password } = &cli.command {
        let token = ApiClient::obtain_token(&cli.api_url, username, password)
            .await
            .map_err(|e| anyhow::anyhow!(e.user_message()))?;
        println!("AGRIPLAN_TOKEN={token}");
        return Ok(());
    }

    let token = cli
        .token
        .clone()
        .context("no API token: set AGRIPLAN_TOKEN or run `agriplan-cli login`")?;
    let client = ApiClient::new(&cli.api_url, token.clone())?;
    let profile = client
        .me()
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;
    let session = Session::new(profile, token);

    match run(cli.command, &client, &session).await {
        Ok(()) => Ok(()),
        // Show API failures the way a page banner would.
        Err(err) => match err.downcast::<agriplan::ApiError>() {
            Ok(api) => bail!("{}", api.user_message()),
            Err(other) => Err(other),
        },
    }
}

async fn run(command: Command, client: &ApiClient, session: &Session) -> Result<()> {
    match command {
        Command::Login { .. } => unreachable!("handled before authentication"),
        Command::Me => {
            let p = &session.profile;
            println!("{} ({})", p.username, p.role);
            if let Some(name) = &p.sector_name {
                println!("  sector: {name}");
            }
            if let Some(name) = &p.department_name {
                println!("  department: {name}");
            }
            if p.is_superuser {
                println!("  superuser");
            }
        }
        Command::Sectors { action } => {
            require(pages::ADMIN, session)?;
            match action {
                CrudCmd::List => {
                    for s in client.list_sectors().await? {
                        println!("{:>5}  {}", s.id, s.name);
                    }
                }
                CrudCmd::Create { name } => {
                    let s = client.create_sector(&name).await?;
                    println!("created sector {} ({})", s.name, s.id);
                }
                CrudCmd::Update { id, name } => {
                    let s = client.update_sector(id, &name).await?;
                    println!("updated sector {} ({})", s.name, s.id);
                }
                CrudCmd::Delete { id } => {
                    client.delete_sector(id).await?;
                    println!("deleted sector {id}");
                }
            }
        }
        Command::Departments { action } => {
            require(pages::ADMIN, session)?;
            match action {
                DepartmentCmd::List { sector } => {
                    for d in client.list_departments(sector).await? {
                        println!("{:>5}  {}  (sector {})", d.id, d.name, d.sector);
                    }
                }
                DepartmentCmd::Create { name, sector } => {
                    let d = client.create_department(&name, sector).await?;
                    println!("created department {} ({})", d.name, d.id);
                }
                DepartmentCmd::Update { id, name, sector } => {
                    let d = client.update_department(id, &name, sector).await?;
                    println!("updated department {} ({})", d.name, d.id);
                }
                DepartmentCmd::Delete { id } => {
                    client.delete_department(id).await?;
                    println!("deleted department {id}");
                }
            }
        }
        Command::Indicators { action } => {
            require(pages::ADMIN, session)?;
            match action {
                IndicatorCmd::List { department } => {
                    for i in client.list_indicators(department).await? {
                        println!(
                            "{:>5}  {}  [{}]  (department {})",
                            i.id, i.name, i.unit, i.department
                        );
                    }
                }
                IndicatorCmd::Create {
                    name,
                    department,
                    unit,
                    description,
                    groups,
                } => {
                    let i = client
                        .create_indicator(&IndicatorPayload {
                            name,
                            unit,
                            description,
                            department,
                            groups,
                        })
                        .await?;
                    println!("created indicator {} ({})", i.name, i.id);
                }
                IndicatorCmd::Update {
                    id,
                    name,
                    department,
                    unit,
                    description,
                    groups,
                } => {
                    let i = client
                        .update_indicator(
                            id,
                            &IndicatorPayload {
                                name,
                                unit,
                                description,
                                department,
                                groups,
                            },
                        )
                        .await?;
                    println!("updated indicator {} ({})", i.name, i.id);
                }
                IndicatorCmd::Delete { id } => {
                    client.delete_indicator(id).await?;
                    println!("deleted indicator {id}");
                }
            }
        }
        Command::Plans { action } => match action {
            PlanCmd::List { filters } => {
                require(pages::PLANS, session)?;
                let plans = client
                    .list_plans(PlanQuery {
                        year: gregorian_year(filters.year)?,
                    })
                    .await?;
                for p in &plans {
                    let ec = calendar::to_ethiopian_year(p.year).unwrap_or(p.year);
                    println!(
                        "{:>5}  {} EC  {} / {} / {}  target {} {}",
                        p.id,
                        ec,
                        p.sector_name,
                        p.department_name,
                        p.indicator_name,
                        p.target,
                        p.indicator_unit
                    );
                }
            }
            PlanCmd::Create {
                year,
                indicator,
                target,
            } => {
                require(pages::ADMIN, session)?;
                let year = calendar::to_gregorian_year(year)
                    .context("Ethiopian year out of range")?;
                let p = client
                    .create_plan(&PlanPayload {
                        year,
                        indicator,
                        target,
                    })
                    .await?;
                println!("created plan {} for indicator {}", p.id, p.indicator);
            }
            PlanCmd::Update {
                id,
                year,
                indicator,
                target,
            } => {
                require(pages::ADMIN, session)?;
                let year = calendar::to_gregorian_year(year)
                    .context("Ethiopian year out of range")?;
                let p = client
                    .update_plan(
                        id,
                        &PlanPayload {
                            year,
                            indicator,
                            target,
                        },
                    )
                    .await?;
                println!("updated plan {} for indicator {}", p.id, p.indicator);
            }
            PlanCmd::Delete { id } => {
                require(pages::ADMIN, session)?;
                client.delete_plan(id).await?;
                println!("deleted plan {id}");
            }
        },
        Command::Breakdowns { action } => {
            require(pages::ENCODING, session)?;
            match action {
                BreakdownCmd::List => {
                    for b in client.list_breakdowns().await? {
                        println!(
                            "{:>5}  plan {}  {} + {} + {} + {} = {}  [{}]",
                            b.id,
                            b.plan,
                            b.q1,
                            b.q2,
                            b.q3,
                            b.q4,
                            b.total(),
                            b.status
                        );
                    }
                }
                BreakdownCmd::Set { plan, q1, q2, q3, q4 } => {
                    let payload = BreakdownPayload { plan, q1, q2, q3, q4 };
                    let existing = client
                        .list_breakdowns()
                        .await?
                        .into_iter()
                        .find(|b| b.plan == plan);
                    let b = match existing {
                        Some(b) => {
                            if !workflow::can_edit_breakdown(session.role(), b.status) {
                                bail!(
                                    "breakdown {} is {} and cannot be edited",
                                    b.id,
                                    b.status
                                );
                            }
                            client.update_breakdown(b.id, &payload).await?
                        }
                        None => client.create_breakdown(&payload).await?,
                    };
                    println!("breakdown {} total {} [{}]", b.id, b.total(), b.status);
                }
                BreakdownCmd::Submit { id } => {
                    let b = client.get_breakdown(id).await?;
                    guard(session.role(), b.status, PlanAction::Submit)?;
                    let b = client.breakdown_action(id, PlanAction::Submit, "").await?;
                    println!("breakdown {} is now {}", b.id, b.status);
                }
                BreakdownCmd::Delete { id } => {
                    let b = client.get_breakdown(id).await?;
                    if !workflow::can_edit_breakdown(session.role(), b.status) {
                        bail!("breakdown {} is {} and cannot be deleted", b.id, b.status);
                    }
                    client.delete_breakdown(id).await?;
                    println!("deleted breakdown {id}");
                }
            }
        }
        Command::Performances { action } => {
            require(pages::ENCODING, session)?;
            match action {
                PerformanceCmd::List { year, quarter } => {
                    let quarter = quarter.map(parse_quarter).transpose()?;
                    let perfs = client
                        .list_performances(PerformanceQuery {
                            year: gregorian_year(year)?,
                            quarter,
                        })
                        .await?;
                    for p in perfs {
                        println!(
                            "{:>5}  plan {}  {}  value {}  [{}]",
                            p.id, p.plan, p.quarter, p.value, p.status
                        );
                    }
                }
                PerformanceCmd::Set { plan, quarter, value } => {
                    let quarter = parse_quarter(quarter)?;
                    let breakdown = client
                        .list_breakdowns()
                        .await?
                        .into_iter()
                        .find(|b| b.plan == plan)
                        .with_context(|| format!("plan {plan} has no quarterly breakdown"))?;
                    let existing = client
                        .list_performances(PerformanceQuery::default())
                        .await?
                        .into_iter()
                        .find(|p| p.plan == plan && p.quarter == quarter);
                    let own_status = existing.as_ref().map(|p| p.status).unwrap_or(Status::Draft);
                    if !workflow::can_edit_performance(session.role(), breakdown.status, own_status)
                    {
                        bail!(
                            "performance for plan {plan} {quarter} cannot be edited \
                             (breakdown {}, performance {})",
                            breakdown.status,
                            own_status
                        );
                    }
                    let payload = PerformancePayload { plan, quarter, value };
                    let p = match existing {
                        Some(p) => client.update_performance(p.id, &payload).await?,
                        None => client.create_performance(&payload).await?,
                    };
                    println!("performance {} {} value {} [{}]", p.id, p.quarter, p.value, p.status);
                }
                PerformanceCmd::Submit { id } => {
                    let p = client.get_performance(id).await?;
                    guard(session.role(), p.status, PlanAction::Submit)?;
                    let p = client.performance_action(id, PlanAction::Submit, "").await?;
                    println!("performance {} is now {}", p.id, p.status);
                }
            }
        }
        Command::Reviews { action } => {
            require(pages::REVIEWS, session)?;
            match action {
                ReviewCmd::List { filters } => {
                    print_queue(client, Status::Submitted, &filters).await?;
                }
                ReviewCmd::Approve { kind, id, comment } => {
                    act(client, session, kind, id, PlanAction::Approve, &comment).await?;
                }
                ReviewCmd::Reject { kind, id, comment } => {
                    act(client, session, kind, id, PlanAction::Reject, &comment).await?;
                }
                ReviewCmd::SubmitToStrategic => {
                    let breakdowns = client.list_breakdowns().await?;
                    let performances =
                        client.list_performances(PerformanceQuery::default()).await?;
                    let (bd_ids, perf_ids) = workflow::approved_ids(&breakdowns, &performances);
                    if bd_ids.is_empty() && perf_ids.is_empty() {
                        println!("nothing is currently approved");
                        return Ok(());
                    }
                    let receipt = client.submit_to_strategic(&bd_ids, &perf_ids).await?;
                    println!(
                        "submitted {} breakdowns and {} performances to Strategic Affairs",
                        receipt.breakdowns, receipt.performances
                    );
                }
            }
        }
        Command::Validations { action } => {
            require(pages::VALIDATIONS, session)?;
            run_gate(client, session, action, Status::Approved, PlanAction::Validate).await?;
        }
        Command::FinalApprovals { action } => {
            require(pages::FINAL_APPROVALS, session)?;
            run_gate(
                client,
                session,
                action,
                Status::Validated,
                PlanAction::FinalApprove,
            )
            .await?;
        }
        Command::MinisterView { filters } => {
            require(pages::MINISTER_VIEW, session)?;
            print_queue(client, Status::FinalApproved, &filters).await?;
        }
        Command::Advise { breakdown, note } => {
            require(pages::ADVISOR_NOTES, session)?;
            let b = client.breakdown_advisor_review(breakdown, &note).await?;
            println!("noted breakdown {} [{}]", b.id, b.status);
        }
        Command::Users { action } => {
            require(pages::ADMIN, session)?;
            match action {
                UserCmd::List => {
                    for u in client.list_users().await? {
                        println!(
                            "{:>5}  {}  {}  {}",
                            u.id,
                            u.username,
                            u.role,
                            if u.is_active { "active" } else { "inactive" }
                        );
                    }
                }
                UserCmd::Create {
                    username,
                    role,
                    first_name,
                    last_name,
                    email,
                    sector,
                    department,
                } => {
                    let u = client
                        .create_user(&UserPayload {
                            username,
                            first_name,
                            last_name,
                            email,
                            role,
                            sector,
                            department,
                            is_active: true,
                        })
                        .await?;
                    println!("created user {} ({})", u.username, u.id);
                }
                UserCmd::Update {
                    id,
                    username,
                    role,
                    first_name,
                    last_name,
                    email,
                    sector,
                    department,
                    active,
                } => {
                    let u = client
                        .update_user(
                            id,
                            &UserPayload {
                                username,
                                first_name,
                                last_name,
                                email,
                                role,
                                sector,
                                department,
                                is_active: active,
                            },
                        )
                        .await?;
                    println!("updated user {} ({})", u.username, u.id);
                }
                UserCmd::Delete { id } => {
                    client.delete_user(id).await?;
                    println!("deleted user {id}");
                }
            }
        }
    }
    Ok(())
}

async fn run_gate(
    client: &ApiClient,
    session: &Session,
    action: GateCmd,
    queue_status: Status,
    advance: PlanAction,
) -> Result<()> {
    match action {
        GateCmd::List { filters } => print_queue(client, queue_status, &filters).await,
        GateCmd::Advance { kind, id } => act(client, session, kind, id, advance, "").await,
        GateCmd::Reject { kind, id, comment } => {
            act(client, session, kind, id, PlanAction::Reject, &comment).await
        }
    }
}

/// One workflow action on a breakdown or performance, guarded the way
/// the pages disabled their buttons.
async fn act(
    client: &ApiClient,
    session: &Session,
    kind: RecordKind,
    id: i64,
    action: PlanAction,
    comment: &str,
) -> Result<()> {
    match kind {
        RecordKind::Breakdown => {
            let record = client.get_breakdown(id).await?;
            workflow::authorize(session.role(), record.status, action, comment)
                .map_err(|e| anyhow::anyhow!("{e}"))?;
            let record = client.breakdown_action(id, action, comment).await?;
            println!("breakdown {} is now {}", record.id, record.status);
        }
        RecordKind::Performance => {
            let record = client.get_performance(id).await?;
            workflow::authorize(session.role(), record.status, action, comment)
                .map_err(|e| anyhow::anyhow!("{e}"))?;
            let record = client.performance_action(id, action, comment).await?;
            println!("performance {} is now {}", record.id, record.status);
        }
    }
    Ok(())
}

/// Fetch, join, filter, group, and print one status queue the way the
/// listing pages rendered their tables.
async fn print_queue(
    client: &ApiClient,
    status: Status,
    filters: &ListFilters,
) -> Result<()> {
    let year = gregorian_year(filters.year)?;
    let plans = client.list_plans(PlanQuery { year }).await?;
    let breakdowns = client.list_breakdowns().await?;
    let performances = client
        .list_performances(PerformanceQuery { year, quarter: None })
        .await?;
    let indicators = client.list_indicators(None).await?;
    let groups = client.list_indicator_groups(None).await.unwrap_or_default();

    let index = PlanIndex::from_plans(plans);
    let labeler = GroupLabeler::new(&indicators, &groups);
    let mut filter = RowFilter::default().with_status(status);
    if let Some(sector) = filters.sector {
        filter = filter.with_sector(sector);
    }
    if let Some(department) = filters.department {
        filter = filter.with_department(department);
    }
    if let Some(search) = &filters.search {
        filter = filter.with_search(search.clone());
    }

    let bd_rows = filter.apply(report::join(&index, &breakdowns));
    let perf_rows = filter.apply(report::join(&index, &performances));

    if !bd_rows.is_empty() {
        println!("Quarterly breakdowns ({status}):");
        for sector in report::group_rows(bd_rows.clone(), &labeler) {
            println!("  {}", sector.sector_name);
            for dept in &sector.departments {
                println!("    {}", dept.department_name);
                for bucket in &dept.buckets {
                    println!("      [{}]", bucket.label);
                    for row in &bucket.rows {
                        let b = row.record;
                        println!(
                            "      {:>5}  {}  target {}  {} + {} + {} + {}",
                            b.id, row.plan.indicator_name, row.plan.target, b.q1, b.q2, b.q3, b.q4
                        );
                    }
                }
            }
        }
        let summary = report::summarize_breakdowns(&bd_rows);
        println!(
            "  totals: target {}  allocated {}",
            summary.target_total, summary.allocated_total
        );
    }

    if !perf_rows.is_empty() {
        println!("Quarterly performances ({status}):");
        for sector in report::group_rows(perf_rows.clone(), &labeler) {
            println!("  {}", sector.sector_name);
            for dept in &sector.departments {
                println!("    {}", dept.department_name);
                for bucket in &dept.buckets {
                    println!("      [{}]", bucket.label);
                    for row in &bucket.rows {
                        let p = row.record;
                        let pct = report::achievement_percent(row.plan.target, p.value)
                            .map(|v| format!("{:.1}%", v))
                            .unwrap_or_else(|| "N/A".to_string());
                        println!(
                            "      {:>5}  {}  {}  value {} / {} ({})",
                            p.id, row.plan.indicator_name, p.quarter, p.value, row.plan.target, pct
                        );
                    }
                }
            }
        }
        let summary = report::summarize_performance(&perf_rows);
        let pct = summary
            .achievement
            .map(|v| format!("{:.1}%", v))
            .unwrap_or_else(|| "N/A".to_string());
        println!(
            "  totals: target {}  actual {}  achievement {}",
            summary.target_total, summary.value_total, pct
        );
    }

    if bd_rows.is_empty() && perf_rows.is_empty() {
        println!("no {status} records match");
    }
    Ok(())
}

fn require(policy: AccessPolicy, session: &Session) -> Result<()> {
    if !policy.allows(&session.profile) {
        bail!(
            "your role ({}) does not have access to this page",
            session.role()
        );
    }
    Ok(())
}

fn guard(role: Role, status: Status, action: PlanAction) -> Result<()> {
    if !workflow::can_act(role, status, action) {
        bail!("role {role} may not {action} a record in status {status}");
    }
    Ok(())
}

fn gregorian_year(ethiopian: Option<i32>) -> Result<Option<i32>> {
    ethiopian
        .map(|y| calendar::to_gregorian_year(y).context("Ethiopian year out of range"))
        .transpose()
}

fn parse_quarter(n: u8) -> Result<Quarter> {
    Quarter::try_from(n).map_err(|e| anyhow::anyhow!("{e}"))
}
