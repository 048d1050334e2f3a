//! Paygate CLI
//!
//! Command-line interface for the payment gateway API.

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

use paygate_client::{PaygateClient, TransactionFilter};
use paygate_types::{BillingType, CreateCustomerParams, CreatePaymentParams};

#[derive(Parser)]
#[command(name = "paygate")]
#[command(author, version, about = "Payment gateway API CLI client", long_about = None)]
struct Cli {
    /// Base URL of the payment gateway API
    #[arg(long, env = "PAYGATE_API_URL", default_value = "http://localhost:3000")]
    api_url: String,

    /// Tenant sent as X-Company-Id
    #[arg(long, env = "PAYGATE_COMPANY_ID")]
    company_id: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Customer operations
    Customer {
        #[command(subcommand)]
        action: CustomerCommands,
    },
    /// Payment operations
    Payment {
        #[command(subcommand)]
        action: PaymentCommands,
    },
    /// Deliver a webhook notification to the API
    Webhook {
        /// Event type, e.g. PAYMENT_RECEIVED
        #[arg(long)]
        event: String,
        /// Provider payment id
        #[arg(long)]
        payment: String,
        /// Shared webhook token
        #[arg(long, env = "PAYMENT_WEBHOOK_TOKEN")]
        token: Option<String>,
    },
    /// List audit-log entries of the --company-id tenant
    Transactions {
        #[arg(long)]
        provider: Option<String>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Check API health
    Health,
}

#[derive(Subcommand)]
enum CustomerCommands {
    /// Register a customer
    Create {
        /// Customer name
        name: String,
        /// CPF or CNPJ, formatted or digits only
        #[arg(long)]
        cpf_cnpj: String,
        #[arg(long)]
        email: Option<String>,
    },
    /// Find a customer by document
    Find {
        cpf_cnpj: String,
    },
}

#[derive(Subcommand)]
enum PaymentCommands {
    /// Create a payment for an existing customer
    Create {
        #[arg(long)]
        customer: String,
        /// BOLETO, CREDIT_CARD, PIX or UNDEFINED
        #[arg(long, default_value = "PIX")]
        billing_type: String,
        #[arg(long)]
        value: Decimal,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due_date: NaiveDate,
        #[arg(long)]
        external_reference: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Get payment details
    Get {
        id: String,
    },
    /// Find a payment by external reference
    Find {
        external_reference: String,
    },
    /// Refund a payment, fully unless --value is given
    Refund {
        id: String,
        #[arg(long)]
        value: Option<Decimal>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Cancel a payment
    Cancel {
        id: String,
    },
    /// Simulate a lifecycle event (custom gateway only)
    Simulate {
        id: String,
        /// confirm, receive, overdue or delete
        action: String,
    },
}

fn parse_billing_type(s: &str) -> Result<BillingType> {
    s.parse().map_err(anyhow::Error::msg)
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut client = PaygateClient::new(&cli.api_url);
    if let Some(company_id) = &cli.company_id {
        client = client.with_company_id(company_id);
    }

    match cli.command {
        Commands::Health => {
            let healthy = client.health().await?;
            if healthy {
                println!("✓ API is healthy");
            } else {
                println!("✗ API is not healthy");
                std::process::exit(1);
            }
        }

        Commands::Customer { action } => match action {
            CustomerCommands::Create {
                name,
                cpf_cnpj,
                email,
            } => {
                let mut params = CreateCustomerParams::new(name, cpf_cnpj);
                params.email = email;
                print_json(&client.create_customer(&params).await?)?;
            }
            CustomerCommands::Find { cpf_cnpj } => match client.find_customer(&cpf_cnpj).await? {
                Some(customer) => print_json(&customer)?,
                None => {
                    println!("✗ No customer registered for this document");
                    std::process::exit(1);
                }
            },
        },

        Commands::Payment { action } => match action {
            PaymentCommands::Create {
                customer,
                billing_type,
                value,
                due_date,
                external_reference,
                description,
            } => {
                let billing_type = parse_billing_type(&billing_type)?;
                let mut params = CreatePaymentParams::new(customer, billing_type, value, due_date);
                params.external_reference = external_reference;
                params.description = description;
                print_json(&client.create_payment(&params).await?)?;
            }
            PaymentCommands::Get { id } => print_json(&client.get_payment(&id).await?)?,
            PaymentCommands::Find { external_reference } => {
                match client.find_payment(&external_reference).await? {
                    Some(payment) => print_json(&payment)?,
                    None => {
                        println!("✗ No payment with external reference {}", external_reference);
                        std::process::exit(1);
                    }
                }
            }
            PaymentCommands::Refund {
                id,
                value,
                description,
            } => {
                let payment = client
                    .refund_payment(&id, value, description.as_deref())
                    .await?;
                print_json(&payment)?;
            }
            PaymentCommands::Cancel { id } => {
                client.cancel_payment(&id).await?;
                println!("✓ Payment cancelled");
            }
            PaymentCommands::Simulate { id, action } => {
                print_json(&client.simulate(&id, &action).await?)?;
            }
        },

        Commands::Webhook {
            event,
            payment,
            token,
        } => {
            let body = serde_json::json!({ "event": event, "payment": { "id": payment } });
            let ack = client.send_webhook(&body, token.as_deref()).await?;
            println!("✓ {} accepted for {}", ack.event, ack.payment_id);
        }

        Commands::Transactions { provider, limit } => {
            let filter = TransactionFilter { provider, limit };
            print_json(&client.list_transactions(&filter).await?)?;
        }
    }

    Ok(())
}
