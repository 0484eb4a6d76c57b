use product_viewer::ViewerConfig;

fn main() -> anyhow::Result<()> {
    product_viewer::run(ViewerConfig::default())
}
