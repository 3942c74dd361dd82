//! Initialize a new site

use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::CONFIG_FILE;

const DEFAULT_CONFIG: &str = r#"# Site
title: My Portfolio
description: I help individuals and companies build better web applications.
author: John Doe
language: en

# URL
url: http://example.com
root: /

# Directory
content_dir: content
public_dir: public

# Writing
render_drafts: false
highlight:
  theme: base16-ocean.dark
  line_number: false

# Home page
latest_projects:
  - hello-project

# Social
social:
  twitter_handle: ''
  profiles:
    - to: https://github.com/
      label: Github
      kind: github
    - to: mailto:john@example.com
      label: Email
      kind: email

# Feed
feed:
  enable: true
  limit: 20
  include_projects: false
"#;

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    let config_path = target_dir.join(CONFIG_FILE);
    if config_path.exists() {
        anyhow::bail!("Site already initialized: {:?} exists", config_path);
    }

    fs::create_dir_all(target_dir.join("content/projects"))?;
    fs::create_dir_all(target_dir.join("content/blog"))?;
    fs::create_dir_all(target_dir.join("public"))?;

    fs::write(&config_path, DEFAULT_CONFIG)?;

    let today = chrono::Utc::now().format("%Y-%m-%d");

    let sample_post = format!(
        r#"---
title: Hello World
slug: hello-world
summary: The first post on this site.
category: General
tags:
  - intro
publishedAt: {today}
---

Welcome! This post lives in `content/blog/hello-world.mdx`.

<!-- more -->

Run `folio generate` to build the JSON indexes and feeds into `public/`.

```bash
folio new "My Next Post"
```
"#
    );

    let sample_project = format!(
        r#"---
name: Hello Project
slug: hello-project
summary: A sample project entry.
category: Web
role: Design & Development
domain:
  - Web
publishedAt: {today}
---

export const bannerImages = ['/images/projects/hello-project/1.png'];

Describe the project here.
"#
    );

    fs::write(target_dir.join("content/blog/hello-world.mdx"), sample_post)?;
    fs::write(
        target_dir.join("content/projects/hello-project.mdx"),
        sample_project,
    )?;

    Ok(())
}
