use clap::{Parser, Subcommand};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::fs;
use std::path::Path;

#[derive(Parser)]
#[command(name = "portal-cli")]
#[command(about = "CLI for the College Admission Portal API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, default_value = "http://localhost:5000")]
    url: String,
}

#[derive(Subcommand)]
enum Commands {
    Register {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
        #[arg(short = 'P', long)]
        phone: String,
        #[arg(short, long, help = "Date of birth, YYYY-MM-DD")]
        dob: String,
        #[arg(short, long, help = "male, female or other")]
        gender: String,
    },
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    Me,
    Submit {
        #[arg(short, long, help = "Path to a JSON file with the application payload")]
        file: String,
    },
    MyApplication,
    DeleteApplication {
        #[arg(short, long)]
        id: String,
    },
    Upload {
        #[arg(short = 'a', long)]
        application_id: String,
        #[arg(short = 't', long, help = "e.g. marksheet_10th, id_proof")]
        document_type: String,
        #[arg(short, long)]
        file: String,
    },
    Documents {
        #[arg(short = 'a', long)]
        application_id: String,
    },
    DeleteDocument {
        #[arg(short, long)]
        id: String,
    },
    // Admin commands below
    Applications {
        #[arg(short, long)]
        status: Option<String>,
        #[arg(short, long)]
        course: Option<String>,
        #[arg(short, long, default_value = "1")]
        page: usize,
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },
    SetStatus {
        #[arg(short = 'a', long)]
        application_id: String,
        #[arg(short, long, help = "pending, approved or rejected")]
        status: String,
        #[arg(short, long)]
        remarks: Option<String>,
    },
    VerifyDocument {
        #[arg(short, long)]
        id: String,
        #[arg(short, long)]
        verified: bool,
        #[arg(short, long)]
        notes: Option<String>,
    },
    Dashboard,
    Users,
    Logout,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
}

const TOKEN_FILE: &str = ".portal_token";

fn saved_token() -> String {
    fs::read_to_string(TOKEN_FILE).unwrap_or_default()
}

fn guess_mime(path: &str) -> &'static str {
    match Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg") => "image/jpg",
        Some("jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = Client::new();

    match cli.command {
        Commands::Register {
            name,
            email,
            password,
            phone,
            dob,
            gender,
        } => {
            let res = client
                .post(format!("{}/api/auth/register", cli.url))
                .json(&json!({
                    "name": name,
                    "email": email,
                    "password": password,
                    "phone": phone,
                    "dateOfBirth": dob,
                    "gender": gender,
                }))
                .send()
                .await?;
            println!("Response: {}", res.text().await?);
        }
        Commands::Login { email, password } => {
            let res = client
                .post(format!("{}/api/auth/login", cli.url))
                .json(&json!({ "email": email, "password": password }))
                .send()
                .await?;
            if res.status().is_success() {
                let body: LoginResponse = res.json().await?;
                // Save token
                fs::write(TOKEN_FILE, body.token)?;
                println!("Logged in. Token saved to {}", TOKEN_FILE);
            } else {
                println!("Login failed: {}", res.text().await?);
            }
        }
        Commands::Me => {
            let res = client
                .get(format!("{}/api/auth/me", cli.url))
                .header("Authorization", format!("Bearer {}", saved_token()))
                .send()
                .await?;
            println!("Response: {}", res.text().await?);
        }
        Commands::Submit { file } => {
            let payload: serde_json::Value = serde_json::from_str(&fs::read_to_string(&file)?)?;
            let res = client
                .post(format!("{}/api/applications", cli.url))
                .header("Authorization", format!("Bearer {}", saved_token()))
                .json(&payload)
                .send()
                .await?;
            println!("Response: {}", res.text().await?);
        }
        Commands::MyApplication => {
            let res = client
                .get(format!("{}/api/applications/my-application", cli.url))
                .header("Authorization", format!("Bearer {}", saved_token()))
                .send()
                .await?;
            println!("Response: {}", res.text().await?);
        }
        Commands::DeleteApplication { id } => {
            let res = client
                .delete(format!("{}/api/applications/{}", cli.url, id))
                .header("Authorization", format!("Bearer {}", saved_token()))
                .send()
                .await?;
            println!("Response: {}", res.text().await?);
        }
        Commands::Upload {
            application_id,
            document_type,
            file,
        } => {
            let bytes = fs::read(&file)?;
            let file_name = Path::new(&file)
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("upload")
                .to_string();
            let part = reqwest::multipart::Part::bytes(bytes)
                .file_name(file_name)
                .mime_str(guess_mime(&file))?;
            let form = reqwest::multipart::Form::new()
                .text("documentType", document_type)
                .part("file", part);

            let res = client
                .post(format!(
                    "{}/api/applications/{}/documents",
                    cli.url, application_id
                ))
                .header("Authorization", format!("Bearer {}", saved_token()))
                .multipart(form)
                .send()
                .await?;
            println!("Response: {}", res.text().await?);
        }
        Commands::Documents { application_id } => {
            let res = client
                .get(format!(
                    "{}/api/applications/{}/documents",
                    cli.url, application_id
                ))
                .header("Authorization", format!("Bearer {}", saved_token()))
                .send()
                .await?;
            println!("Response: {}", res.text().await?);
        }
        Commands::DeleteDocument { id } => {
            let res = client
                .delete(format!("{}/api/applications/documents/{}", cli.url, id))
                .header("Authorization", format!("Bearer {}", saved_token()))
                .send()
                .await?;
            println!("Response: {}", res.text().await?);
        }
        Commands::Applications {
            status,
            course,
            page,
            limit,
        } => {
            let mut query: Vec<(String, String)> = vec![
                ("page".to_string(), page.to_string()),
                ("limit".to_string(), limit.to_string()),
            ];
            if let Some(status) = status {
                query.push(("status".to_string(), status));
            }
            if let Some(course) = course {
                query.push(("course".to_string(), course));
            }
            let res = client
                .get(format!("{}/api/admin/applications", cli.url))
                .query(&query)
                .header("Authorization", format!("Bearer {}", saved_token()))
                .send()
                .await?;
            println!("Response: {}", res.text().await?);
        }
        Commands::SetStatus {
            application_id,
            status,
            remarks,
        } => {
            let res = client
                .put(format!(
                    "{}/api/admin/applications/{}/status",
                    cli.url, application_id
                ))
                .header("Authorization", format!("Bearer {}", saved_token()))
                .json(&json!({ "status": status, "remarks": remarks }))
                .send()
                .await?;
            println!("Response: {}", res.text().await?);
        }
        Commands::VerifyDocument { id, verified, notes } => {
            let res = client
                .put(format!("{}/api/admin/documents/{}/verify", cli.url, id))
                .header("Authorization", format!("Bearer {}", saved_token()))
                .json(&json!({ "isVerified": verified, "verificationNotes": notes }))
                .send()
                .await?;
            println!("Response: {}", res.text().await?);
        }
        Commands::Dashboard => {
            let res = client
                .get(format!("{}/api/admin/dashboard", cli.url))
                .header("Authorization", format!("Bearer {}", saved_token()))
                .send()
                .await?;
            println!("Response: {}", res.text().await?);
        }
        Commands::Users => {
            let res = client
                .get(format!("{}/api/users", cli.url))
                .header("Authorization", format!("Bearer {}", saved_token()))
                .send()
                .await?;
            println!("Response: {}", res.text().await?);
        }
        Commands::Logout => {
            let _ = fs::remove_file(TOKEN_FILE);
            println!("Logged out (token removed).");
        }
    }

    Ok(())
}
