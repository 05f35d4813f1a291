use minijinja::{Environment, context};

use crate::config::SiteMeta;

const REPOSITORY_LINK_TEMPLATE: &str = r#"<li class="part-title"><a href="{{ repository }}"><i class="fa fa-github" style="font-size:20px;padding-right:5px;padding-top:12px;position:relative;top:1px"></i>{{ repository }}</a></li>"#;

const METADATA_TEMPLATE: &str = r#"<meta property="og:image" content="{{ image }}" /><meta property="og:site_name" content="{{ name }}" /><meta property="og:title" content="{{ title }}" /><meta name="twitter:image:src" content="{{ image }}" />{% if twitter %}<meta name="twitter:site" content="{{ twitter }}" />{% endif %}<meta name="twitter:card" content="summary" /><meta name="twitter:title" content="{{ title }}" />"#;

/// Fixed markup appended to every page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippets {
    pub repository_link: String,
    pub metadata: String,
}

pub fn render_snippets(site: &SiteMeta) -> Result<Snippets, minijinja::Error> {
    let mut env = Environment::new();
    env.add_template("repository_link.html", REPOSITORY_LINK_TEMPLATE)?;
    env.add_template("metadata.html", METADATA_TEMPLATE)?;

    let ctx = context! {
        repository => site.repository,
        name => site.name,
        title => site.title,
        image => site.image,
        twitter => site.twitter,
    };
    Ok(Snippets {
        repository_link: env.get_template("repository_link.html")?.render(&ctx)?,
        metadata: env.get_template("metadata.html")?.render(&ctx)?,
    })
}
