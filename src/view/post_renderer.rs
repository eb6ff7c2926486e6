use std::io::ErrorKind;
use std::path::Path;
use std::{fs, io};

use ramhorns::Template;

use crate::content::markdown_renderer::RenderedPost;
use crate::content::Post;
use crate::text_utils::format_date;

pub const POST_TEMPLATE_FILE: &str = "post.tpl";

pub const DEFAULT_POST_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{{post_title}}</title>
</head>
<body>
<article>
<header>
<h1>{{post_title}}</h1>
<p class="meta">{{date}}{{#has_author}} by {{author}}{{/has_author}}</p>
<ul class="categories">{{#categories}}<li>{{name}}</li>{{/categories}}</ul>
<ul class="tags">{{#tags}}<li>{{name}}</li>{{/tags}}</ul>
</header>
{{{toc}}}
{{{post_content}}}
</article>
</body>
</html>
"#;

#[derive(ramhorns::Content)]
struct ViewName<'a> {
    name: &'a str,
}

#[derive(ramhorns::Content)]
struct ViewItem<'a> {
    post_title: &'a str,
    date: &'a str,
    has_author: bool,
    author: &'a str,
    categories: Vec<ViewName<'a>>,
    tags: Vec<ViewName<'a>>,
    toc: &'a str,
    post_content: &'a str,
}

pub struct PostRenderer<'a> {
    pub template: Template<'a>,
}

impl PostRenderer<'_> {
    pub fn new(view_tpl_src: &str) -> io::Result<PostRenderer> {
        let template = match Template::new(view_tpl_src) {
            Ok(x) => x,
            Err(e) => {
                return Err(io::Error::new(ErrorKind::InvalidInput, format!("Error parsing post view template: {}", e)));
            }
        };

        Ok(PostRenderer {
            template,
        })
    }

    /// `post.tpl` from the template directory when there is one, else the built-in page.
    pub fn load_template(template_dir: Option<&Path>) -> io::Result<String> {
        if let Some(dir) = template_dir {
            let path = dir.join(POST_TEMPLATE_FILE);
            if path.is_file() {
                return fs::read_to_string(&path).map_err(|e| {
                    io::Error::new(e.kind(), format!("Error reading template: {} - file={}", e, path.display()))
                });
            }
        }
        Ok(DEFAULT_POST_TEMPLATE.to_string())
    }

    pub fn render(&self, post: &Post, rendered: &RenderedPost) -> String {
        let date = post.front_matter.date
            .map(|d| d.to_string())
            .or_else(|| post.date().map(|d| format_date(&d)))
            .unwrap_or_default();
        let categories = post.front_matter.categories.iter().map(|c| ViewName { name: c.as_str() }).collect();
        let tags = post.front_matter.tags.iter().map(|t| ViewName { name: t.as_str() }).collect();
        let author = post.front_matter.author.as_deref().unwrap_or("");

        self.template.render(&ViewItem {
            post_title: post.title(),
            date: date.as_str(),
            has_author: !author.is_empty(),
            author,
            categories,
            tags,
            toc: rendered.toc.as_deref().unwrap_or(""),
            post_content: rendered.html.as_str(),
        })
    }
}
