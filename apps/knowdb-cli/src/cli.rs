use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "knowdb")]
#[command(about = "Semantic retrieval over a small in-memory knowledge base", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Retrieve the documents most relevant to a question")]
    Query {
        #[arg(help = "Natural-language question")]
        text: String,

        #[arg(short, long, help = "Number of documents (overrides retrieval.top_k)")]
        k: Option<usize>,

        #[arg(
            short,
            long,
            default_value = "architecture",
            help = "Built-in corpus (architecture, ml-primer), a JSON file or a directory of .txt files"
        )]
        corpus: String,

        #[arg(long, help = "Similarity metric: cosine or euclidean (overrides retrieval.metric)")]
        metric: Option<String>,

        #[arg(long, help = "Citation style: inline or block (overrides retrieval.citation_style)")]
        style: Option<String>,
    },

    #[command(about = "Invoke a tool with JSON arguments")]
    Tool {
        #[arg(help = "Tool name, see `knowdb tools`")]
        name: String,

        #[arg(default_value = "{}", help = "JSON object of tool arguments")]
        input: String,

        #[arg(short, long, default_value = "architecture", help = "Corpus backing retrieve_documents")]
        corpus: String,
    },

    #[command(about = "List available tools")]
    Tools,
}
