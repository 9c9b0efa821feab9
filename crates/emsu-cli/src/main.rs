use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;
use emsu_cli::admin::{MIN_PASSWORD_LENGTH, NewAdmin, create_admin};
use emsu_cli::seeder::{self, SeedConfig};
use emsu_db::{SqlitePool, init_db_pool};

#[derive(Parser)]
#[command(name = "emsu-cli")]
#[command(about = "EMSU CLI - Administrative tools for EMSU", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an admin account
    CreateAdmin {
        #[arg(short = 'f', long)]
        first_name: Option<String>,

        #[arg(short = 'l', long)]
        last_name: Option<String>,

        #[arg(short = 'e', long)]
        email: Option<String>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Seed the database with fake teachers, students, classes and their records
    Seed {
        #[arg(long, default_value = "10")]
        teachers: usize,

        #[arg(short = 's', long, default_value = "100")]
        students: usize,

        #[arg(short = 'c', long, default_value = "6")]
        classes: usize,

        /// Grades per student
        #[arg(long, default_value = "4")]
        grades: usize,

        /// Fees per student
        #[arg(long, default_value = "2")]
        fees: usize,

        /// Days of attendance, counting back from today
        #[arg(long, default_value = "5")]
        days: usize,
    },
    /// Delete all seeded records (real records are kept)
    ClearSeed,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let cli = Cli::parse();
    let pool = init_db_pool().await?;
    sqlx::migrate!("../../migrations").run(&pool).await?;

    let result = match cli.command {
        Commands::CreateAdmin {
            first_name,
            last_name,
            email,
            password,
        } => handle_create_admin(&pool, first_name, last_name, email, password).await,
        Commands::Seed {
            teachers,
            students,
            classes,
            grades,
            fees,
            days,
        } => {
            let config = SeedConfig::default()
                .with_teachers(teachers)
                .with_students(students)
                .with_classes(classes)
                .with_grades_per_student(grades)
                .with_fees_per_student(fees)
                .with_attendance_days(days);
            seeder::seed_all(&pool, &config).await.map(|_| ())
        }
        Commands::ClearSeed => seeder::clear_all(&pool).await.map(|_| ()),
    };

    pool.close().await;

    if let Err(e) = result {
        eprintln!("\n❌ {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

fn prompt(value: Option<String>, label: &str) -> anyhow::Result<String> {
    match value {
        Some(value) => Ok(value),
        None => Ok(Input::<String>::new().with_prompt(label).interact_text()?),
    }
}

async fn handle_create_admin(
    pool: &SqlitePool,
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    password: Option<String>,
) -> anyhow::Result<()> {
    let first_name = prompt(first_name, "First name")?;
    let last_name = prompt(last_name, "Last name")?;
    let email = prompt(email, "Email address")?;
    let password = match password {
        Some(password) => password,
        None => Password::new()
            .with_prompt(format!("Password (min {MIN_PASSWORD_LENGTH} characters)"))
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()?,
    };

    let id = create_admin(
        pool,
        NewAdmin {
            first_name: &first_name,
            last_name: &last_name,
            email: &email,
            password: &password,
        },
    )
    .await?;

    println!("\n✅ Admin created successfully!");
    println!("   ID: {id}");
    println!("   Email: {}", email.trim().to_lowercase());
    println!("   Name: {first_name} {last_name}");
    Ok(())
}
