// 该文件是 Caiquan （猜拳） 项目的一部分。
// src/remote/server.rs - WebSocket 判定服务
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use actix_cors::Cors;
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, middleware::Logger, web};
use futures::StreamExt;
use tracing::{info, warn};

use super::RemoteJudge;
use crate::{detector::HandDetector, moves::MoveSource};

/// 启动服务，`GET /game` 升级为 WebSocket
pub async fn serve<D, S>(
  judge: RemoteJudge<D, S>,
  bind: &str,
  workers: usize,
) -> std::io::Result<()>
where
  D: HandDetector + Send + 'static,
  S: MoveSource + Send + 'static,
{
  let judge = web::Data::new(judge);
  info!("启动远程判定服务: {} ({} 个工作线程)", bind, workers);
  HttpServer::new(move || {
    App::new()
      .wrap(Logger::new("%r %s %Ts"))
      .wrap(
        Cors::default()
          .allow_any_origin()
          .allow_any_method()
          .allow_any_header(),
      )
      .app_data(judge.clone())
      .route("/game", web::get().to(game::<D, S>))
  })
  .workers(workers)
  .bind(bind)?
  .run()
  .await
}

async fn game<D, S>(
  judge: web::Data<RemoteJudge<D, S>>,
  body: web::Payload,
  req: HttpRequest,
) -> actix_web::Result<HttpResponse>
where
  D: HandDetector + Send + 'static,
  S: MoveSource + Send + 'static,
{
  let (response, session, stream) = actix_ws::handle(&req, body)?;
  info!("客户端已连接: {:?}", req.peer_addr());
  actix_web::rt::spawn(relay(judge, session, stream));
  Ok(response)
}

/// 逐条处理同一连接上的消息，上一帧判定完成后才读取下一帧
async fn relay<D, S>(
  judge: web::Data<RemoteJudge<D, S>>,
  mut session: actix_ws::Session,
  mut stream: actix_ws::MessageStream,
) where
  D: HandDetector + Send + 'static,
  S: MoveSource + Send + 'static,
{
  while let Some(message) = stream.next().await {
    match message {
      Ok(actix_ws::Message::Text(text)) => {
        let judge = judge.clone();
        let text = text.to_string();
        let reply = match web::block(move || judge.handle_text(&text)).await {
          Ok(reply) => reply,
          Err(e) => {
            warn!("判定任务失败: {}", e);
            None
          }
        };
        if let Some(reply) = reply
          && session.text(reply).await.is_err()
        {
          break;
        }
      }
      Ok(actix_ws::Message::Ping(bytes)) => {
        if session.pong(&bytes).await.is_err() {
          break;
        }
      }
      Ok(actix_ws::Message::Close(reason)) => {
        info!("客户端断开连接: {:?}", reason);
        let _ = session.close(reason).await;
        return;
      }
      Ok(_) => continue,
      Err(e) => {
        warn!("WebSocket 协议错误: {}", e);
        break;
      }
    }
  }
  let _ = session.close(None).await;
}
