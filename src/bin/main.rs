//! Cicada CLI - inspect and query a demo entity model
//!
//! Usage:
//!   cicada metadata [--config <cicada.toml>]
//!   cicada read [--set <EntitySet>] [--skip <n>] [--top <n>] [--count]
//!
//! Examples:
//!   cicada metadata
//!   cicada read --set Students --top 5 --count
//!   cicada read --set Students --older-than 18 --order-by Name --desc

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use cicada::marshal::MarshalResult;
use cicada::pipeline::CollectionRequest;
use cicada::prelude::*;

#[derive(Parser)]
#[command(name = "cicada")]
#[command(about = "Cicada - serve a typed entity model as schema and paged reads")]
#[command(version)]
struct Cli {
    /// Settings file (defaults to the standard search path)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the schema document of the demo model as JSON
    Metadata,

    /// Run a collection read against the in-memory demo data
    Read {
        /// Entity set to read
        #[arg(short, long, default_value = "Students")]
        set: String,

        /// Number of entities to skip
        #[arg(long)]
        skip: Option<usize>,

        /// Maximum number of entities to return
        #[arg(long)]
        top: Option<usize>,

        /// Include the total count
        #[arg(long)]
        count: bool,

        /// Only students older than this age
        #[arg(long)]
        older_than: Option<i32>,

        /// Property to order by
        #[arg(long)]
        order_by: Option<String>,

        /// Order descending
        #[arg(long)]
        desc: bool,

        /// Inline each student's courses
        #[arg(long)]
        expand_courses: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    };
    let settings = match settings {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Settings error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let service = match demo_service(settings) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Startup error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Metadata => cmd_metadata(&service),
        Commands::Read {
            set,
            skip,
            top,
            count,
            older_than,
            order_by,
            desc,
            expand_courses,
        } => {
            let mut options = QueryOptions::new();
            options.skip = skip;
            options.top = top;
            options.count = count;
            if let Some(age) = older_than {
                options = options.with_filter(prop("Age").gt(lit_int(age)));
            }
            if let Some(name) = order_by {
                let item = if desc {
                    OrderByItem::desc(prop(&name))
                } else {
                    OrderByItem::asc(prop(&name))
                };
                options = options.with_order_by(item);
            }
            if expand_courses {
                options = options.with_expand(ExpandOption::of(&["Courses"]));
            }
            cmd_read(&service, &set, options)
        }
    }
}

fn cmd_metadata(service: &Service) -> ExitCode {
    let schemas = match service.metadata() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Schema error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    print_json(&schemas)
}

fn cmd_read(service: &Service, set: &str, options: QueryOptions) -> ExitCode {
    let request = CollectionRequest::new(set, options).with_request(&format!("/{}", set), None);
    match service.read_collection(&request) {
        Ok(collection) => print_json(&collection),
        Err(e) => {
            let failure = e.into_failure();
            eprintln!("Read failed ({}): {}", failure.status, failure.message);
            ExitCode::FAILURE
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Serialization error: {}", e);
            ExitCode::FAILURE
        }
    }
}

// =============================================================================
// Demo model
// =============================================================================

struct Grade;

impl Describe for Grade {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::enumeration("Grade", &["A", "B", "C", "D", "F"])
    }
}

struct Address {
    street: String,
    city: String,
}

impl Describe for Address {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::complex("Address")
            .field(FieldDescriptor::property("street", string()).named("Street"))
            .field(FieldDescriptor::property("city", string()).named("City"))
    }
}

impl Structured for Address {
    fn to_record(&self) -> Record {
        Record::new("Address")
            .with("street", self.street.as_str())
            .with("city", self.city.as_str())
    }

    fn from_record(record: &Record) -> MarshalResult<Self> {
        let text = |field: &str| {
            record
                .get(field)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        Ok(Self {
            street: text("street"),
            city: text("city"),
        })
    }
}

struct Course;

impl Describe for Course {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::entity("Course", &["Id"])
            .entity_set("Courses")
            .field(FieldDescriptor::property("id", int64()).named("Id"))
            .field(FieldDescriptor::property("title", string()).named("Title"))
    }
}

struct Student;

impl Describe for Student {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::entity("Student", &["Id"])
            .entity_set("Students")
            .field(FieldDescriptor::property("id", int64()).named("Id"))
            .field(FieldDescriptor::property("name", string()).named("Name"))
            .field(FieldDescriptor::property("age", int32()).named("Age"))
            .field(FieldDescriptor::property("grade", ValueType::enumeration("Grade")).named("Grade"))
            .field(FieldDescriptor::property("address", ValueType::complex("Address")).named("Address"))
            .field(
                FieldDescriptor::navigation(
                    "courses",
                    ValueType::collection(ValueType::entity("Course")),
                )
                .named("Courses"),
            )
    }
}

const NAMES: [&str; 6] = ["Ada", "Grace", "Joe", "Linus", "Margaret", "Ken"];
const CITIES: [&str; 3] = ["Boston", "Seattle", "Denver"];
const GRADES: [&str; 5] = ["A", "B", "C", "D", "F"];
const TITLES: [&str; 4] = ["Algebra", "Biology", "Chemistry", "Drama"];

fn demo_courses() -> Vec<Record> {
    TITLES
        .iter()
        .zip(1_i64..)
        .map(|(title, id)| Record::new("Course").with("id", id).with("title", *title))
        .collect()
}

fn demo_students(courses: &[Record]) -> Vec<Record> {
    (0..250_usize)
        .map(|i| {
            let address = Address {
                street: format!("{} Main St", i + 1),
                city: CITIES[i % CITIES.len()].to_string(),
            };
            let enrolled: Vec<Value> = courses
                .iter()
                .skip(i % courses.len())
                .take(2)
                .cloned()
                .map(Value::Entity)
                .collect();
            Record::new("Student")
                .with("id", i as i64 + 1)
                .with("name", format!("{} {}", NAMES[i % NAMES.len()], i + 1))
                .with("age", 16 + (i % 10) as i32)
                .with("grade", Value::enumeration(GRADES[i % GRADES.len()]))
                .with("address", Value::Complex(address.to_record()))
                .with("courses", Value::Collection(enrolled))
        })
        .collect()
}

fn demo_service(settings: Settings) -> Result<Service, cicada::ServiceError> {
    let courses = demo_courses();
    let students = demo_students(&courses);

    Service::builder(settings)
        .register::<Grade>()
        .register::<Address>()
        .register::<Course>()
        .register::<Student>()
        .operation(RepositoryOperation::new(
            "Student",
            MemoryExecutor::new(students),
        ))
        .operation(RepositoryOperation::new(
            "Course",
            MemoryExecutor::new(courses),
        ))
        .build()
}
