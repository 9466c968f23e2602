// Command-line front end for the toolbox:
//   file-toolbox list
//   file-toolbox <tool> '<json arguments>'

use file_toolbox::Toolbox;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let toolbox = Toolbox::from_env()?;

    match args.get(1).map(String::as_str) {
        Some("list") => {
            println!("{}", serde_json::to_string_pretty(&toolbox.describe())?);
        }
        Some(tool_name) => {
            let arguments = args.get(2).map(String::as_str).unwrap_or("{}");
            println!("{}", toolbox.call(tool_name, arguments).await);
        }
        None => {
            println!("File Toolbox - usage: file-toolbox list | file-toolbox <tool> '<json>'");
            println!("Available tools: {}", toolbox.tool_names().join(", "));
        }
    }

    Ok(())
}
