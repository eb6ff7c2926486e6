#[cfg(test)]
pub const POST_FILE_NAME: &str = "_posts/2024-05-01-how-does-a-load-balancer-work.md";

#[cfg(test)]
pub const POST_DATA: &str = r#"---
layout: post
title: "How does a load balancer work?"
date: 2024-05-01 09:30:00 +0000
categories: [Networking, System Design]
tags: [load-balancing, nginx, interviews]
toc: true
---

A load balancer spreads incoming requests across a pool of servers.

## 1. Key Concepts

Layer 4 balancers route on IP and port, layer 7 balancers look at the request.

### Health checks

Unhealthy backends are taken out of rotation.

## 2. Bottlenecks

```nginx
## not a heading
upstream backend { server a; server b; }
```
"#;

#[cfg(test)]
pub const BROKEN_POST: &str = r#"---
layout: page
title: Broken post
date: 2024-05-03
tags:
  - redis
  - Redis
  - redis
permalink: /broken/
---
```markdown
# Broken post

Generated text pasted as is.
```
"#;
